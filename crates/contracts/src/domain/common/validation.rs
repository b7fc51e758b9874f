//! Правила проверки полей, общие для документов и справочников.
//!
//! Все функции возвращают `Err(String)` с текстом для пользователя.

pub fn require_text(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("Поле «{}» не может быть пустым", field));
    }
    Ok(())
}

pub fn require_positive(value: f64, field: &str) -> Result<(), String> {
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("Поле «{}» должно быть больше нуля", field));
    }
    Ok(())
}

/// Минимальная проверка адреса: непустая локальная часть, `@`, точка в домене
pub fn validate_email(value: &str) -> Result<(), String> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    };
    if !valid {
        return Err(format!("Некорректный email: {}", value));
    }
    Ok(())
}

/// ISO 4217: три заглавные латинские буквы
pub fn validate_currency(value: &str) -> Result<(), String> {
    if value.len() != 3 || !value.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(format!("Некорректный код валюты: {}", value));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert!(require_text("abc", "Наименование").is_ok());
        assert!(require_text("   ", "Наименование").is_err());
        assert!(require_text("", "Наименование").is_err());
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive(0.5, "Количество").is_ok());
        assert!(require_positive(0.0, "Количество").is_err());
        assert!(require_positive(-3.0, "Количество").is_err());
        assert!(require_positive(f64::NAN, "Количество").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ops@cargo.example").is_ok());
        assert!(validate_email("ops@localhost").is_err());
        assert!(validate_email("@cargo.example").is_err());
        assert!(validate_email("ops@.example").is_err());
        assert!(validate_email("ops@@cargo.example").is_err());
        assert!(validate_email("no-at-sign").is_err());
    }

    #[test]
    fn test_validate_currency() {
        assert!(validate_currency("USD").is_ok());
        assert!(validate_currency("usd").is_err());
        assert!(validate_currency("US").is_err());
        assert!(validate_currency("EURO").is_err());
    }
}
