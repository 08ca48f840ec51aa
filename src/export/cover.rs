//! Cover page settings and the structural fallback cover.

use serde::Deserialize;

use crate::util::escape_xml;

/// What the cover page shows.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CoverSettings {
    /// Report title; the project name when absent.
    pub title: Option<String>,
    pub organization_name: String,
    pub show_organization: bool,
    /// Text standing in for a logo.
    pub logo_text: Option<String>,
    pub show_logo: bool,
    pub version: Option<String>,
    pub show_version: bool,
    pub date: Option<String>,
    pub show_date: bool,
}

impl Default for CoverSettings {
    fn default() -> Self {
        Self {
            title: None,
            organization_name: String::new(),
            show_organization: true,
            logo_text: None,
            show_logo: true,
            version: None,
            show_version: true,
            date: None,
            show_date: true,
        }
    }
}

fn shown(flag: bool, value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| flag && !v.is_empty())
}

impl CoverSettings {
    /// Plain-heading cover markup, used when no custom cover renders.
    pub fn fallback_html(&self, project_name: &str) -> String {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(project_name);

        let mut html = String::from("<div class=\"cover\" style=\"text-align: center\">");
        if let Some(logo) = shown(self.show_logo, self.logo_text.as_deref()) {
            html.push_str(&format!(
                "<p style=\"font-size: 24pt; font-weight: bold\">{}</p>",
                escape_xml(logo)
            ));
        }
        html.push_str(&format!("<h1>{}</h1>", escape_xml(title)));
        if let Some(org) = shown(self.show_organization, Some(self.organization_name.as_str())) {
            html.push_str(&format!("<h2>{}</h2>", escape_xml(org)));
        }
        if let Some(version) = shown(self.show_version, self.version.as_deref()) {
            html.push_str(&format!("<p>Version {}</p>", escape_xml(version)));
        }
        if let Some(date) = shown(self.show_date, self.date.as_deref()) {
            html.push_str(&format!("<p>{}</p>", escape_xml(date)));
        }
        html.push_str("</div>");
        html
    }
}
