//! Mermaid flow of the business steps of one test case, rendered as a
//! standalone HTML page that Allure shows as an attachment.

use crate::config::DiagramSettings;
use crate::report::Attachment;
use crate::step::StepRecord;

/// Content type of the diagram attachment.
pub const HTML_CONTENT_TYPE: &str = "text/html";

/// Mermaid classes, one per Allure status.
const CLASS_DEFS: [(&str, &str); 5] = [
    ("passed", "fill:#e6ffed,stroke:#34a853;"),
    ("failed", "fill:#ffecec,stroke:#d93025;"),
    ("broken", "fill:#fff4e5,stroke:#fbbc04;"),
    ("skipped", "fill:#f0f0f0,stroke:#9aa0a6;"),
    ("unknown", "fill:#ffffff,stroke:#000000;"),
];

/// One box in the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowNode {
    pub label: String,
    pub status: String,
}

impl FlowNode {
    pub fn from_step(step: &StepRecord) -> Self {
        let status = match step.status_text() {
            Some(status) if !status.is_empty() => status.to_string(),
            _ => "unknown".to_string(),
        };
        Self {
            label: step.name().to_string(),
            status,
        }
    }

    /// Mermaid class for the node's status.
    pub fn style_class(&self) -> &'static str {
        let status = self.status.to_lowercase();
        CLASS_DEFS
            .iter()
            .map(|(class, _)| *class)
            .find(|class| *class == status)
            .unwrap_or("unknown")
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// The Mermaid `graph LR` definition: nodes, one chain of edges, classes.
pub fn mermaid_graph(nodes: &[FlowNode]) -> Vec<String> {
    let mut lines = vec!["graph LR".to_string()];
    let ids: Vec<String> = (0..nodes.len()).map(|i| format!("step{}", i)).collect();

    for (id, node) in ids.iter().zip(nodes) {
        lines.push(format!(
            "{}[\"{} - {}\"]",
            id,
            escape_html(&node.label),
            escape_html(&node.status)
        ));
    }
    lines.push(ids.join(" --> "));
    for (class, style) in CLASS_DEFS {
        lines.push(format!("classDef {} {}", class, style));
    }
    for (id, node) in ids.iter().zip(nodes) {
        lines.push(format!("class {} {}", id, node.style_class()));
    }
    lines
}

/// Full HTML page, or `None` when there is nothing to draw.
pub fn render_html(nodes: &[FlowNode], settings: &DiagramSettings) -> Option<String> {
    if nodes.is_empty() {
        return None;
    }

    let mut parts = vec![
        "<!doctype html>".to_string(),
        r#"<html><head><meta charset="utf-8"><meta name="viewport" content="width=device-width,initial-scale=1">"#.to_string(),
        format!(
            r#"<script src="{}"></script>"#,
            escape_html(&settings.mermaid_script_url)
        ),
        "<style>body{font-family: Arial, Helvetica, sans-serif; padding: 12px;} .mermaid{max-width:100%;}</style>".to_string(),
        "<script>mermaid.initialize({startOnLoad:true});</script>".to_string(),
        "</head><body>".to_string(),
        format!("<h3>{}</h3>", escape_html(&settings.title)),
        r#"<div class="mermaid">"#.to_string(),
    ];
    parts.extend(mermaid_graph(nodes));
    parts.push("</div></body></html>".to_string());

    Some(parts.join("\n"))
}

pub fn attachment(settings: &DiagramSettings, file_name: &str) -> Attachment {
    Attachment::new(&settings.attachment_name, file_name, HTML_CONTENT_TYPE)
}
