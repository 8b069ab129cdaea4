const MAX_USER_NAME_LEN: usize = 100;
const MAX_FILE_NAME_LEN: usize = 255;
const MAX_EMAIL_LEN: usize = 254;

fn validate_name(name: &str, entity: &str, max_len: usize) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err(format!("{entity} name cannot be empty"));
    }
    if name.chars().count() > max_len {
        return Err(format!("{entity} name cannot exceed {max_len} characters"));
    }
    if name.chars().any(char::is_control) {
        return Err(format!("{entity} name cannot contain control characters"));
    }
    Ok(())
}

pub fn validate_user_name(name: &str) -> Result<(), String> {
    validate_name(name, "User", MAX_USER_NAME_LEN)
}

pub fn validate_file_name(name: &str) -> Result<(), String> {
    validate_name(name, "File", MAX_FILE_NAME_LEN)?;
    if name.contains('/') || name.contains('\\') {
        return Err("File name cannot contain path separators".to_string());
    }
    Ok(())
}

/// Structural check only: one `@`, a non-empty local part and a dotted
/// domain with no empty labels.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.len() > MAX_EMAIL_LEN {
        return Err(format!("the email cannot exceed {MAX_EMAIL_LEN} characters."));
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.split('.').any(str::is_empty)
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err("the email must be a valid email address.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+tag@mail.example.org").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("alice").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@example").is_err());
        assert!(validate_email("alice@@example.com").is_err());
        assert!(validate_email("alice@.com").is_err());
        assert!(validate_email("alice@example.com.").is_err());
        assert!(validate_email("a@b..com").is_err());
        assert!(validate_email("al ice@example.com").is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("report.pdf").is_ok());
        assert!(validate_file_name("Quarterly report (final).xlsx").is_ok());

        assert!(validate_file_name("").is_err());
        assert!(validate_file_name("   ").is_err());
        assert!(validate_file_name("../etc/passwd").is_err());
        assert!(validate_file_name(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_user_name() {
        assert!(validate_user_name("Alice Example").is_ok());
        assert!(validate_user_name("").is_err());
        assert!(validate_user_name("bad\nname").is_err());
    }
}
