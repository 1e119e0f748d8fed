//! Settings-page configuration model and form-field rendering.
//!
//! A [`SettingsConfig`] describes an administrative settings page as data
//! (sections of typed fields, deserializable from JSON/TOML via serde).
//! [`render_field`] turns one field into escaped form markup;
//! [`validate_input`] runs submitted values through each field's rule list.

use crate::error::{SpectromError, SpectromResult};
use serde::Deserialize;
use std::fmt::Write;
use std::str::FromStr;

/// Top-level settings-page description.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsConfig {
    /// Admin page slug the sections render on.
    pub page: String,
    /// Option group name.
    pub group: String,
    /// Option name the values persist under.
    pub option: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl SettingsConfig {
    /// Find a section by id.
    pub fn section(&self, section_id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == section_id)
    }

    /// Find a field within a section.
    pub fn field(&self, section_id: &str, field_id: &str) -> Option<&Field> {
        self.section(section_id)?
            .fields
            .iter()
            .find(|f| f.id == field_id)
    }
}

/// One titled group of fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Section {
    pub id: String,
    pub title: String,
    /// Optional descriptive text shown under the section title.
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// One form field.
#[derive(Debug, Clone, Deserialize)]
pub struct Field {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    /// Placeholder option shown first in a select.
    #[serde(default)]
    pub option_title: Option<String>,
    /// (cols, rows) for a textarea.
    #[serde(default)]
    pub size: Option<(u32, u32)>,
    #[serde(default)]
    pub class: Option<String>,
    /// Validation rule strings, e.g. `"required"`, `"maxlen:40"`.
    #[serde(default)]
    pub rules: Vec<String>,
    /// Custom message reported when the field's regex rule fails.
    #[serde(default)]
    pub error: Option<String>,
}

/// A label/value pair for select and radio fields.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// The enumerated field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Select,
    Radio,
    Checkbox,
    Textarea,
    Button,
    Password,
    Message,
}

impl FromStr for FieldType {
    type Err = SpectromError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "select" => Ok(Self::Select),
            "radio" => Ok(Self::Radio),
            "checkbox" => Ok(Self::Checkbox),
            "textarea" => Ok(Self::Textarea),
            "button" => Ok(Self::Button),
            "password" => Ok(Self::Password),
            "message" => Ok(Self::Message),
            other => Err(SpectromError::input(format!(
                "unrecognized field type: {other}"
            ))),
        }
    }
}

/// Escape text for an HTML attribute value.
pub fn esc_attr(s: &str) -> String {
    esc_html(s)
}

/// Escape text for HTML body content.
pub fn esc_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

fn is_truthy(value: &str) -> bool {
    !matches!(value, "" | "0" | "false")
}

/// Render the section heading and optional header text.
pub fn render_section_header(section: &Section) -> String {
    let mut out = format!("<h3>{}</h3>\n", esc_html(&section.title));
    if let Some(header) = &section.header {
        let _ = writeln!(out, "<p>{}</p>", esc_html(header));
    }
    out
}

/// Render one field as form markup. The input name is namespaced by the
/// section id so submitted values group per section.
pub fn render_field(section_id: &str, field: &Field) -> SpectromResult<String> {
    let field_type: FieldType = field.field_type.parse()?;
    let id = esc_attr(&field.id);
    let name = format!("{}[{}]", esc_attr(section_id), id);
    let value = field.value.as_deref().unwrap_or("");

    let mut out = String::new();
    match field_type {
        FieldType::Text | FieldType::Password => {
            let input_type = if field_type == FieldType::Password {
                "password"
            } else {
                "text"
            };
            let class = match &field.class {
                Some(class) => format!("regular-text {}", esc_attr(class)),
                None => "regular-text".to_string(),
            };
            let _ = write!(
                out,
                "<input type=\"{input_type}\" id=\"{id}\" name=\"{name}\" class=\"{class}\" value=\"{}\" />",
                esc_attr(value)
            );
        }
        FieldType::Select => {
            let _ = writeln!(out, "<select id=\"{id}\" name=\"{name}\">");
            if let Some(option_title) = &field.option_title {
                let _ = writeln!(
                    out,
                    "<option value=\"0\">{}</option>",
                    esc_html(option_title)
                );
            }
            for option in &field.options {
                let selected = if option.value == value {
                    " selected=\"selected\""
                } else {
                    ""
                };
                let _ = writeln!(
                    out,
                    "<option value=\"{}\"{selected}>{}</option>",
                    esc_attr(&option.value),
                    esc_html(&option.label)
                );
            }
            out.push_str("</select>");
        }
        FieldType::Radio => {
            for option in &field.options {
                let checked = if option.value == value {
                    " checked=\"checked\""
                } else {
                    ""
                };
                let _ = writeln!(
                    out,
                    "<input type=\"radio\" name=\"{name}\" value=\"{}\"{checked} />&nbsp;{}&nbsp;",
                    esc_attr(&option.value),
                    esc_html(&option.label)
                );
            }
        }
        FieldType::Checkbox => {
            let checked = if is_truthy(value) {
                " checked=\"checked\""
            } else {
                ""
            };
            let _ = write!(
                out,
                "<input type=\"checkbox\" id=\"{id}\" name=\"{name}\"{checked} />"
            );
        }
        FieldType::Textarea => {
            let _ = write!(out, "<textarea id=\"{id}\" name=\"{name}\"");
            if let Some((cols, rows)) = field.size {
                let _ = write!(out, " cols=\"{cols}\" rows=\"{rows}\"");
            }
            let _ = write!(out, ">{}</textarea>", esc_html(value));
        }
        FieldType::Button => {
            let class = field.class.as_deref().unwrap_or("");
            let _ = write!(
                out,
                "<button type=\"button\" id=\"{id}\" name=\"{name}\" class=\"{}\">{}</button>",
                esc_attr(class),
                esc_html(value)
            );
        }
        FieldType::Message => {
            let _ = write!(out, "<p id=\"{id}\">{}</p>", esc_html(value));
        }
    }
    Ok(out)
}

/// Run a section's submitted values through each field's rule list.
///
/// Returns `(field id, message)` pairs for every failed rule. Values are
/// taken (and possibly transformed, e.g. by `striphtml`) from `values`;
/// missing fields validate as empty strings.
#[cfg(feature = "validate")]
pub fn validate_input(
    config: &SettingsConfig,
    section_id: &str,
    values: &mut std::collections::HashMap<String, String>,
) -> SpectromResult<Vec<(String, String)>> {
    use crate::validation::{Rule, Validator};

    let section = config
        .section(section_id)
        .ok_or_else(|| SpectromError::input(format!("unknown settings section: {section_id}")))?;

    let mut failures = Vec::new();
    for field in &section.fields {
        if field.rules.is_empty() {
            continue;
        }
        let rules = Rule::parse_list(&field.rules);
        let mut value = values.get(&field.id).cloned().unwrap_or_default();

        let mut validator = Validator::new();
        if let Some(error) = &field.error {
            validator.set_field_error(error);
        }
        validator.validate(&mut value, &rules);
        for message in validator.errors() {
            failures.push((field.id.clone(), message.clone()));
        }
        values.insert(field.id.clone(), value);
    }
    Ok(failures)
}
