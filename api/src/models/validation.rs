use serde::Serialize;

/// One rejected input field, shaped like `{"loc": [...], "msg": "...", "type": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl FieldError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: &'static str) -> Self {
        Self {
            loc: loc.iter().map(|s| s.to_string()).collect(),
            msg: msg.into(),
            kind,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn single(loc: &[&str], msg: impl Into<String>, kind: &'static str) -> Self {
        Self(vec![FieldError::new(loc, msg, kind)])
    }

    pub fn push(&mut self, loc: &[&str], msg: impl Into<String>, kind: &'static str) {
        self.0.push(FieldError::new(loc, msg, kind));
    }

    #[cfg(test)]
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn check_len(&mut self, loc: &[&str], value: &str, min: usize, max: usize) {
        let len = value.chars().count();
        if len < min {
            self.push(
                loc,
                format!("String should have at least {min} character(s)"),
                "string_too_short",
            );
        } else if len > max {
            self.push(
                loc,
                format!("String should have at most {max} characters"),
                "string_too_long",
            );
        }
    }

    pub fn check_email(&mut self, loc: &[&str], value: &str) {
        if !is_plausible_email(value) {
            self.push(loc, "value is not a valid email address", "value_error");
        }
    }

    // Comparisons are negated so NaN never passes.
    pub fn check_gt(&mut self, loc: &[&str], value: f64, bound: f64) {
        if !(value > bound) {
            self.push(loc, format!("Input should be greater than {bound}"), "greater_than");
        }
    }

    pub fn check_ge(&mut self, loc: &[&str], value: f64, bound: f64) {
        if !(value >= bound) {
            self.push(
                loc,
                format!("Input should be greater than or equal to {bound}"),
                "greater_than_equal",
            );
        }
    }

    pub fn check_le(&mut self, loc: &[&str], value: f64, bound: f64) {
        if !(value <= bound) {
            self.push(
                loc,
                format!("Input should be less than or equal to {bound}"),
                "less_than_equal",
            );
        }
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.loc.join("."), e.msg))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Inputs that carry their own field rules.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

// Deliverability isn't checked, only the shape local@domain.tld.
fn is_plausible_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}
