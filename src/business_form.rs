pub const UNKNOWN_BUSINESS_FORM: &str = "???";

/// Short category and the text that identifies it. Longer, more specific
/// phrases come before the phrases they contain.
const BUSINESS_FORMS: &[(&str, &str)] = &[
    ("ООО", "общество с ограниченной ответственностью"),
    ("ООО", " ооо "),
    ("НАО", "непубличное акционерное общество"),
    ("ПАО", "публичное акционерное общество"),
    ("ПАО", " пао "),
    ("ЗАО", "закрытое акционерное общество"),
    ("ЗАО", " зао "),
    ("ОАО", "открытое акционерное общество"),
    ("ОАО", " оао "),
    ("АО", "акционерное общество"),
    ("АО", " ао "),
    ("ИП", "индивидуальный предприниматель"),
    ("ИП", " ип "),
    ("ФГУП", "федеральное государственное унитарное предприятие"),
    ("ГУП", "государственное унитарное предприятие"),
    ("МУП", "муниципальное унитарное предприятие"),
    ("МБДОУ", "муниципальное бюджетное дошкольное образовательное учреждение"),
    ("МБОУ", "муниципальное бюджетное общеобразовательное учреждение"),
    ("МАДОУ", "муниципальное автономное дошкольное образовательное учреждение"),
    ("МАОУ", "муниципальное автономное общеобразовательное учреждение"),
    ("ГБУЗ", "государственное бюджетное учреждение здравоохранения"),
    ("ФГБУ", "федеральное государственное бюджетное учреждение"),
    ("ГБУ", "государственное бюджетное учреждение"),
    ("МБУ", "муниципальное бюджетное учреждение"),
    ("НКО", "некоммерческая организация"),
    ("КФХ", "крестьянское (фермерское) хозяйство"),
    ("КФХ", "крестьянское фермерское хозяйство"),
];

/// Maps the full business-form text of a record to a short category such as
/// "ООО", or "???" when no alias matches.
pub fn simplify_business_form(business_form: &str) -> &'static str {
    let normalized = format!(" {} ", business_form.to_lowercase().replace('-', " "));
    let normalized = normalized.replace(['"', '«', '»', ','], " ");

    BUSINESS_FORMS
        .iter()
        .find(|(_, text)| normalized.contains(text))
        .map(|(slug, _)| *slug)
        .unwrap_or(UNKNOWN_BUSINESS_FORM)
}
