//! Request body validation for employee writes.
//!
//! Bodies arrive as raw JSON so that type mismatches are reported per field
//! instead of failing deserialization as a whole.

use platform_api::FieldErrors;
use serde_json::{Map, Value};

use crate::model::{EmployeePatch, NewEmployee};

pub const NAME: &str = "name";
pub const EMAIL: &str = "email";
pub const DEPARTMENT: &str = "department";
pub const ROLE: &str = "role";

pub const NAME_MAX_LEN: usize = 100;
pub const EMAIL_MAX_LEN: usize = 254;
pub const DEPARTMENT_MAX_LEN: usize = 50;
pub const ROLE_MAX_LEN: usize = 50;

const NON_FIELD_ERRORS: &str = "non_field_errors";
const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_A_STRING: &str = "Not a valid string.";
const INVALID_EMAIL: &str = "Enter a valid email address.";

/// Validates a create body. `name` and `email` are required.
pub fn validate_new(body: &Value) -> Result<NewEmployee, FieldErrors> {
    let object = as_object(body)?;
    let mut errors = FieldErrors::new();
    let patch = collect(object, &mut errors);
    for field in [NAME, EMAIL] {
        if !object.contains_key(field) {
            errors.add(field, REQUIRED);
        }
    }
    match (patch.name, patch.email) {
        (Some(name), Some(email)) if errors.is_empty() => Ok(NewEmployee {
            name,
            email,
            department: patch.department.flatten(),
            role: patch.role.flatten(),
        }),
        _ => Err(errors),
    }
}

/// Validates a partial update body; only supplied fields are checked.
pub fn validate_patch(body: &Value) -> Result<EmployeePatch, FieldErrors> {
    let object = as_object(body)?;
    let mut errors = FieldErrors::new();
    let patch = collect(object, &mut errors);
    errors.into_result(patch)
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    body.as_object().ok_or_else(|| {
        FieldErrors::single(
            NON_FIELD_ERRORS,
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type_name(body)
            ),
        )
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn collect(object: &Map<String, Value>, errors: &mut FieldErrors) -> EmployeePatch {
    let name = required_string(object, NAME, NAME_MAX_LEN, errors);
    let email = required_string(object, EMAIL, EMAIL_MAX_LEN, errors).and_then(|email| {
        if is_valid_email(&email) {
            Some(email)
        } else {
            errors.add(EMAIL, INVALID_EMAIL);
            None
        }
    });
    EmployeePatch {
        name,
        email,
        department: nullable_string(object, DEPARTMENT, DEPARTMENT_MAX_LEN, errors),
        role: nullable_string(object, ROLE, ROLE_MAX_LEN, errors),
    }
}

/// A supplied field that may be neither null nor blank.
fn required_string(
    object: &Map<String, Value>,
    field: &str,
    max_len: usize,
    errors: &mut FieldErrors,
) -> Option<String> {
    match read_string(object.get(field)?, max_len) {
        Ok(Some(value)) if value.is_empty() => {
            errors.add(field, NOT_BLANK);
            None
        }
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            errors.add(field, NOT_NULL);
            None
        }
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

fn nullable_string(
    object: &Map<String, Value>,
    field: &str,
    max_len: usize,
    errors: &mut FieldErrors,
) -> Option<Option<String>> {
    match read_string(object.get(field)?, max_len) {
        Ok(value) => Some(value),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

/// `Ok(None)` for JSON null. Numbers are accepted and stringified.
fn read_string(value: &Value, max_len: usize) -> Result<Option<String>, String> {
    let text = match value {
        Value::Null => return Ok(None),
        Value::String(raw) => raw.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return Err(NOT_A_STRING.to_string()),
    };
    if text.chars().count() > max_len {
        return Err(format!(
            "Ensure this field has no more than {max_len} characters."
        ));
    }
    Ok(Some(text))
}

/// Syntactic email check: `local@domain.tld`, no whitespace, sane labels.
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    valid_local_part(local) && valid_domain(domain)
}

fn valid_local_part(local: &str) -> bool {
    const SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-.";
    !local.is_empty()
        && local.len() <= 64
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_alphanumeric() || SPECIALS.contains(c))
}

fn valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || domain.len() > 253 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty()
            && label.chars().count() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    });
    let tld = labels[labels.len() - 1];
    labels_ok && tld.chars().count() >= 2 && !tld.chars().all(|c| c.is_ascii_digit())
}
