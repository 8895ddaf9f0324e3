//! Form descriptors served to the host's admin UI.

use serde::Serialize;

use super::settings::{SsoSettings, keys};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text { value: String },
    Checkbox { checked: bool },
    Select { value: String, options: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormField {
    pub name: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FormField {
    fn text(name: &str, label: &str, value: &str) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            explanation: None,
            kind: FieldKind::Text {
                value: value.to_owned(),
            },
        }
    }

    fn checkbox(name: &str, label: &str, checked: bool) -> Self {
        Self {
            name: name.to_owned(),
            label: label.to_owned(),
            explanation: None,
            kind: FieldKind::Checkbox { checked },
        }
    }

    fn explained(mut self, explanation: &str) -> Self {
        self.explanation = Some(explanation.to_owned());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSection {
    pub title: String,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormDescriptor {
    pub sections: Vec<FormSection>,
    pub submit: String,
}

fn section(title: &str, fields: Vec<FormField>) -> FormSection {
    FormSection {
        title: title.to_owned(),
        fields,
    }
}

/// The configuration form, filled with `current` values.
#[must_use]
pub fn config_form(current: &SsoSettings) -> FormDescriptor {
    FormDescriptor {
        sections: vec![
            section(
                "Identity Provider",
                vec![
                    FormField::text(keys::PATH, "Path", &current.install_path)
                        .explained("Filesystem path to the SSO installation."),
                    FormField::text(keys::AUTH_SOURCE, "Auth Source", &current.auth_source)
                        .explained("The ID of the SSO authentication source."),
                    FormField::checkbox(keys::REQUIRED, "Required", current.required).explained(
                        "If checked, users must authenticate via single sign-on. \
                         Otherwise, users can also log in with a local username and password.",
                    ),
                ],
            ),
            section(
                "User Matching",
                vec![
                    FormField::text(keys::ATTRIBUTE, "Attribute", &current.attribute).explained(
                        "Attribute supplied by the identity provider to match with local \
                         user data (e.g. uid).",
                    ),
                    FormField::text(keys::FORMAT, "Attribute Format", &current.format).explained(
                        "Format the attribute before matching. Use %s as a placeholder for \
                         the attribute value and %% for a literal percent sign.",
                    ),
                    FormField::checkbox(keys::EMAIL, "Match Email Address", current.match_email)
                        .explained(
                            "If checked, match the user's email address to the formatted \
                             attribute. Otherwise, match the username.",
                        ),
                ],
            ),
            section(
                "Login Form",
                vec![
                    FormField::text(keys::PLUGIN_TITLE, "Plugin Title", &current.plugin_title)
                        .explained(
                            "Title to display above the single sign-on button. \
                             Will not be displayed if left blank.",
                        ),
                    FormField::text(keys::PLUGIN_BUTTON, "Plugin Button", &current.plugin_button)
                        .explained(
                            "Label for the single sign-on button. \
                             Will use \"Single Sign-On Log In\" if left blank.",
                        ),
                    FormField::text(keys::DEFAULT_TITLE, "Default Title", &current.default_title)
                        .explained(
                            "Title to display above the local login form. \
                             Will not be displayed if left blank.",
                        ),
                ],
            ),
            section(
                "Logout",
                vec![
                    FormField::text(keys::LOGOUT_URL, "Logout URL", &current.logout_url).explained(
                        "URL to redirect to after logout. Will redirect to the home page if \
                         left blank.",
                    ),
                ],
            ),
        ],
        submit: "Save Changes".to_owned(),
    }
}

/// The add-user form: the host's user fields plus an activation checkbox.
#[must_use]
pub fn add_user_form(roles: &[String]) -> FormDescriptor {
    let role = FormField {
        name: "role".to_owned(),
        label: "Role".to_owned(),
        explanation: None,
        kind: FieldKind::Select {
            value: roles.first().cloned().unwrap_or_default(),
            options: roles.to_vec(),
        },
    };

    FormDescriptor {
        sections: vec![section(
            "User",
            vec![
                FormField::text("username", "Username", ""),
                FormField::text("name", "Display Name", ""),
                FormField::text("email", "Email", ""),
                role,
                FormField::checkbox("active", "Active?", false)
                    .explained("Inactive users cannot log in to the site."),
            ],
        )],
        submit: "Add User".to_owned(),
    }
}
