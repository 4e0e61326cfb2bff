// src/domain/phone.rs

/// Brazilian mobile numbers normalized for WhatsApp:
/// country code "55" + 2-digit area code + '9' + 8 digits, no "+".
const COUNTRY_CODE: &str = "55";

/// Canonicalize a raw phone string into dialable international form.
///
/// Rules (input is reduced to digits first):
/// - 11 digits with the 3rd digit '9': already carries the mobile indicator,
///   just prefix "55".
/// - 10 digits: insert '9' after the 2-digit area code, prefix "55".
/// - 11 digits with the 3rd digit not '9': insert '9' after the area code,
///   prefix "55".
/// - Anything else (including empty/None): no value. Callers must treat this
///   as "no WhatsApp contact available", never as an error.
pub fn normalize_phone(raw: Option<&str>) -> Option<String> {
    let digits: String = raw?.chars().filter(|c| c.is_ascii_digit()).collect();

    match digits.len() {
        11 if digits.as_bytes()[2] == b'9' => Some(format!("{COUNTRY_CODE}{digits}")),
        10 | 11 => Some(format!(
            "{COUNTRY_CODE}{}9{}",
            &digits[..2],
            &digits[2..]
        )),
        _ => None,
    }
}

/// A number is outreach-ready when it has exactly the shape
/// 55 + area code + '9' + 8 digits (13 digits total).
pub fn is_whatsapp_ready(number: &str) -> bool {
    number.len() == 13
        && number.starts_with(COUNTRY_CODE)
        && number.as_bytes()[4] == b'9'
        && number.chars().all(|c| c.is_ascii_digit())
}

/// Try candidate values in priority order, returning the first one the
/// validator accepts. Used for the mobile/landline column fallback when
/// backfilling clients from the API.
pub fn first_valid<T, F>(candidates: &[Option<&str>], accept: F) -> Option<T>
where
    F: Fn(&str) -> Option<T>,
{
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .find_map(|c| accept(c))
}
