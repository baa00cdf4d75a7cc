//! Turns decoded service results into output lines.
//!
//! Grid service methods answer with `[output_objects, [code, text]]`, where
//! each output object is a struct tagged by `object_type`. Anything else is
//! shown as a plain value.

use gridshell_rpc::Fault;
use gridshell_rpc::RpcValue;

pub const FAULT_HINT: &str = "The type signature of this method may be missed or incorrect.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Title,
    Header,
    SectionHeader,
    Error,
    Warning,
    Dim,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Plain => "text",
            Style::Title => "title",
            Style::Header => "header",
            Style::SectionHeader => "sectionheader",
            Style::Error => "error",
            Style::Warning => "warning",
            Style::Dim => "dim",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub style: Style,
    pub text: String,
}

impl Line {
    pub fn new(style: Style, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(Style::Plain, text)
    }
}

pub fn render_fault(fault: &Fault) -> Vec<Line> {
    vec![
        Line::new(
            Style::Error,
            format!("Internal Error {}: {}", fault.code, fault.message),
        ),
        Line::plain(FAULT_HINT),
    ]
}

pub fn render_result(value: &RpcValue) -> Vec<Line> {
    if let Some(fault) = value.as_fault() {
        return render_fault(&fault);
    }
    let Some((objects, status)) = split_result(value) else {
        return vec![Line::plain(value.show())];
    };

    let mut lines = Vec::new();
    for object in objects {
        render_object(object, &mut lines);
    }
    if let Some((code, text)) = status {
        if code != 0 {
            lines.push(Line::new(Style::Error, format!("Exit code {}: {}", code, text)));
        }
    }
    lines
}

type Status<'a> = Option<(i64, &'a str)>;

fn split_result(value: &RpcValue) -> Option<(&[RpcValue], Status<'_>)> {
    let items = value.as_list()?;
    let objects = items.first()?.as_list()?;
    if !objects.iter().all(|o| o.get("object_type").is_some()) {
        return None;
    }
    let status = items.get(1).and_then(|s| {
        let code = s.at(0)?.as_i64()?;
        let text = s.at(1).and_then(RpcValue::as_str).unwrap_or_default();
        Some((code, text))
    });
    Some((objects, status))
}

fn text_of<'a>(object: &'a RpcValue, field: &str) -> &'a str {
    object.get(field).and_then(RpcValue::as_str).unwrap_or_default()
}

fn render_object(object: &RpcValue, lines: &mut Vec<Line>) {
    let kind = text_of(object, "object_type");
    let text = text_of(object, "text");
    match kind {
        "title" => lines.push(Line::new(Style::Title, format!("Title: {}", text))),
        "header" => lines.push(Line::new(Style::Header, text.to_uppercase())),
        "sectionheader" => lines.push(Line::new(Style::SectionHeader, text)),
        "text" => lines.push(Line::plain(text)),
        "error_text" => lines.push(Line::new(Style::Error, format!("** {} **", text))),
        "warning" => lines.push(Line::new(Style::Warning, format!("! {} !", text))),
        "timing_info" => lines.push(Line::new(Style::Dim, text)),
        "link" => {
            let shown = match text_of(object, "plain_text") {
                "" => text,
                plain => plain,
            };
            if !shown.is_empty() {
                lines.push(Line::plain(shown));
            }
        }
        "list" => {
            for item in object.get("list").and_then(RpcValue::as_list).unwrap_or_default() {
                lines.push(Line::plain(item.show()));
            }
        }
        "file_output" => {
            let path = text_of(object, "path");
            if !path.is_empty() {
                lines.push(Line::new(Style::Dim, format!("File: {}", path)));
            }
            for line in object.get("lines").and_then(RpcValue::as_list).unwrap_or_default() {
                lines.push(Line::plain(line.show().trim_end_matches('\n')));
            }
        }
        "dir_listings" => render_dir_listings(object, lines),
        "start" | "end" => {}
        _ => lines.push(Line::plain(object.show())),
    }
}

fn render_dir_listings(object: &RpcValue, lines: &mut Vec<Line>) {
    let listings = object
        .get("dir_listings")
        .and_then(RpcValue::as_list)
        .unwrap_or_default();
    for listing in listings {
        let entries = listing
            .get("entries")
            .and_then(RpcValue::as_list)
            .unwrap_or_default();
        for entry in entries {
            let name = text_of(entry, "name");
            let mut line = String::new();
            for prefix in ["long_format", "actual_dir"] {
                let value = text_of(entry, prefix);
                if !value.is_empty() {
                    line.push_str(value);
                    line.push(' ');
                }
            }
            line.push_str(name);
            let style = if text_of(entry, "type") == "directory" {
                Style::Header
            } else {
                Style::Plain
            };
            lines.push(Line::new(style, line));
        }
    }
}
