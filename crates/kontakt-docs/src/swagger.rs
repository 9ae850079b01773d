//! Swagger UI page.
//!
//! The page loads Swagger UI from a CDN and points it at the URL where the
//! server publishes the OpenAPI document, so the page itself never needs to
//! be regenerated when routes change.

/// Swagger UI configuration and HTML generation.
#[derive(Debug, Clone)]
pub struct SwaggerUi {
    path: String,
    spec_url: String,
    title: String,
    deep_linking: bool,
    doc_expansion: DocExpansion,
    swagger_version: String,
}

/// Initial expansion of the operation list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocExpansion {
    /// Everything collapsed.
    None,
    /// Operations listed, details collapsed.
    #[default]
    List,
    /// Everything expanded.
    Full,
}

impl DocExpansion {
    const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::List => "list",
            Self::Full => "full",
        }
    }
}

impl SwaggerUi {
    /// Creates a page served at `path` that renders the document at `spec_url`.
    #[must_use]
    pub fn new(path: impl Into<String>, spec_url: impl Into<String>, api_title: &str) -> Self {
        Self {
            path: path.into(),
            spec_url: spec_url.into(),
            title: format!("{api_title} - Documentation"),
            deep_linking: true,
            doc_expansion: DocExpansion::List,
            swagger_version: "5.18.2".to_string(),
        }
    }

    /// Set the page title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Enable or disable deep linking.
    #[must_use]
    pub fn deep_linking(mut self, enabled: bool) -> Self {
        self.deep_linking = enabled;
        self
    }

    /// Set the initial expansion.
    #[must_use]
    pub fn doc_expansion(mut self, expansion: DocExpansion) -> Self {
        self.doc_expansion = expansion;
        self
    }

    /// Set the Swagger UI version loaded from the CDN.
    #[must_use]
    pub fn swagger_version(mut self, version: impl Into<String>) -> Self {
        self.swagger_version = version.into();
        self
    }

    /// Path the page is served at.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// URL of the OpenAPI document the page loads.
    #[must_use]
    pub fn spec_url(&self) -> &str {
        &self.spec_url
    }

    /// Renders the HTML page.
    #[must_use]
    pub fn html(&self) -> String {
        format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui.css" />
    <style>
        body {{
            margin: 0;
            background: #fafafa;
        }}
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@{version}/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {{
            window.ui = SwaggerUIBundle({{
                url: "{spec_url}",
                dom_id: '#swagger-ui',
                deepLinking: {deep_linking},
                docExpansion: '{doc_expansion}',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            }});
        }};
    </script>
</body>
</html>"##,
            title = html_escape(&self.title),
            version = html_escape(&self.swagger_version),
            spec_url = html_escape(&self.spec_url),
            deep_linking = self.deep_linking,
            doc_expansion = self.doc_expansion.as_str(),
        )
    }

    /// Renders the HTML page as bytes.
    #[must_use]
    pub fn html_bytes(&self) -> bytes::Bytes {
        bytes::Bytes::from(self.html())
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
