use crate::errors::ExtractError;
use crate::model::FieldTag;
use regex::Regex;
use std::sync::LazyLock;

pub const HIDDEN_LOCATION_PLACEHOLDER: &str = "❌ Локация скрыта";

const ID_PATTERN: &str = r"№\s*(\d+)";

/// Label phrasings seen on the listing pages, in priority order. The first
/// pattern that matches the lowercased label decides the tag.
const LABEL_PATTERNS: &[(&str, FieldTag)] = &[
    (ID_PATTERN, FieldTag::Id),
    (
        r"наименование\s+(юридического\s+лица|проверяемого\s+лица|организации)|организационно[\s-]*правов|ф\.\s*и\.\s*о\.\s+индивидуального",
        FieldTag::BusinessForm,
    ),
    (r"огрн|основной\s+государственный\s+регистрационный\s+номер", FieldTag::Ogrn),
    (r"^инн\b|идентификационный\s+номер\s+налогоплательщика", FieldTag::Inn),
    (
        r"мест[оа]\s+(нахождения|фактического|осуществления|проведения)|адрес",
        FieldTag::Locations,
    ),
    (r"дата\s+начала", FieldTag::AuditStartDate),
    (r"срок\s+проведения", FieldTag::AuditDuration),
    (r"форма\s+проведения|вид\s+проверки", FieldTag::AuditType),
    (
        r"орган[аы]?\s+(государственного|муниципального)\s+контроля|контрольн\S*\s+\(надзорн\S*\)\s+орган",
        FieldTag::AuditAuditor,
    ),
    (r"статус", FieldTag::AuditStatus),
    (r"цел[ьи]", FieldTag::AuditTarget),
];

static LABEL_RULES: LazyLock<Vec<(Regex, FieldTag)>> = LazyLock::new(|| {
    LABEL_PATTERNS
        .iter()
        .map(|(pattern, tag)| {
            let re = Regex::new(pattern).expect("label pattern must be valid");
            (re, *tag)
        })
        .collect()
});

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ID_PATTERN).expect("identifier pattern must be valid"));

static HIDDEN_LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bскрыт|не\s+подлежит\s+(опубликованию|размещению)|ограниченного\s+доступа")
        .expect("hidden location pattern must be valid")
});

/// Detects which field a label cell describes.
pub fn classify_label(label: &str) -> Option<FieldTag> {
    let content = label.trim().to_lowercase();
    LABEL_RULES
        .iter()
        .find(|(re, _)| re.is_match(&content))
        .map(|(_, tag)| *tag)
}

/// Produces the cleaned value for a row already classified as `tag`.
pub fn normalize_value(tag: FieldTag, label: &str, value: &str) -> Result<String, ExtractError> {
    match tag {
        // The number lives in the label cell, e.g. "№ 1042".
        FieldTag::Id => ID_RE
            .captures(label.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ExtractError::MissingIdentifier {
                label: label.to_string(),
            }),
        FieldTag::Locations => Ok(normalize_locations(value)),
        FieldTag::AuditDuration => Ok(value.replace('\n', " ").trim().to_string()),
        _ => Ok(value.trim().to_string()),
    }
}

fn normalize_locations(value: &str) -> String {
    value
        .replace(';', "\n")
        .split('\n')
        .map(str::trim)
        .map(|location| {
            if HIDDEN_LOCATION_RE.is_match(location) {
                HIDDEN_LOCATION_PLACEHOLDER
            } else {
                location
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
