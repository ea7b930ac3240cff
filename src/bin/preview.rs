//! Local preview server: drives the plugin's content handler against an
//! in-memory store so view assemblies can be inspected without a host
//! dashboard. Not the host runtime — a development harness.

use std::fmt::Write as FmtWrite;
use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use knav::component::{Component, Config};
use knav::{ContentResponse, MemoryStore, Plugin, load_seed};
use serde_json::json;
use tiny_http::{Header, Method, Request, Response, Server, StatusCode};

#[derive(Parser, Debug)]
#[command(name = "knav-preview", about = "Serve knav view assemblies locally")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// YAML file holding a sequence of resource documents to seed the store
    #[arg(long)]
    seed: Option<PathBuf>,
}

const CLIENT_ID: &str = "preview";

fn main() -> Result<()> {
    let args = Args::parse();
    let store = MemoryStore::new();
    if let Some(seed) = &args.seed {
        let documents = load_seed(seed)?;
        println!("seeded {} documents from {}", documents.len(), seed.display());
        store.seed(documents)?;
    }
    let plugin = Plugin::new(&store);

    let server = Server::http(&args.listen)
        .map_err(|err| anyhow!("failed to bind {}: {err}", args.listen))?;
    println!("knav preview listening on http://{}", args.listen);

    for request in server.incoming_requests() {
        if let Err(err) = handle_request(&plugin, request) {
            eprintln!("error handling request: {err}");
        }
    }
    Ok(())
}

fn handle_request(plugin: &Plugin<'_>, request: Request) -> Result<()> {
    if *request.method() != Method::Get {
        let response = Response::from_string("Only GET supported")
            .with_status_code(StatusCode(405))
            .with_header(content_type("text/plain"));
        request.respond(response)?;
        return Ok(());
    }

    let url = request.url().to_string();
    let path = url.split('?').next().unwrap_or("");
    let response = if let Some(content_path) = path.strip_prefix("/api") {
        match plugin.handle_content(content_path, CLIENT_ID) {
            Ok(content) => json_response(serde_json::to_string_pretty(&content)?),
            Err(err) => error_response(500, err),
        }
    } else {
        match plugin.handle_content(path.trim_end_matches('/'), CLIENT_ID) {
            Ok(content) => html_response(render_page(&content)),
            Err(err) => error_response(500, err),
        }
    };
    request.respond(response)?;
    Ok(())
}

fn render_page(content: &ContentResponse) -> String {
    let mut html = String::new();
    html.push_str(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\" /><title>knav preview</title>",
    );
    html.push_str(
        "<style>body{font-family:sans-serif;margin:2rem;}table.grid{border-collapse:collapse;margin-bottom:1.5rem;}table.grid th,table.grid td{border:1px solid #ccc;padding:0.35rem 0.6rem;text-align:left;}section{margin-bottom:2rem;}pre{background:#f4f4f4;padding:0.75rem;border-radius:4px;overflow-x:auto;}dt{font-weight:bold;margin-top:0.5rem;}</style>",
    );
    html.push_str("</head><body><h1>");
    for (position, crumb) in content.title.iter().enumerate() {
        if position > 0 {
            html.push_str(" / ");
        }
        html.push_str(&render_component(crumb));
    }
    html.push_str("</h1>");
    for node in &content.body {
        html.push_str("<section>");
        html.push_str(&render_component(node));
        html.push_str("</section>");
    }
    html.push_str("</body></html>");
    html
}

fn render_component(component: &Component) -> String {
    let mut out = String::new();
    if let Some(title) = &component.metadata.title {
        out.push_str("<h2>");
        for crumb in title {
            out.push_str(&render_component(crumb));
        }
        out.push_str("</h2>");
    }
    match &component.config {
        Config::Text { value } => out.push_str(&escape_html(value)),
        Config::Link { value, reference, .. } => {
            let _ = write!(
                out,
                "<a href=\"{}\">{}</a>",
                escape_html(reference),
                escape_html(value)
            );
        }
        Config::Timestamp { timestamp } => {
            let _ = write!(out, "<time>{timestamp}</time>");
        }
        Config::Table {
            columns,
            rows,
            empty_content,
            ..
        } => {
            if rows.is_empty() {
                let _ = write!(out, "<p>{}</p>", escape_html(empty_content));
            } else {
                out.push_str("<table class=\"grid\"><thead><tr>");
                for column in columns {
                    let _ = write!(out, "<th>{}</th>", escape_html(&column.name));
                }
                out.push_str("</tr></thead><tbody>");
                for row in rows {
                    out.push_str("<tr>");
                    for column in columns {
                        let cell = row
                            .get(&column.accessor)
                            .map(render_component)
                            .unwrap_or_default();
                        let _ = write!(out, "<td>{cell}</td>");
                    }
                    out.push_str("</tr>");
                }
                out.push_str("</tbody></table>");
            }
        }
        Config::Summary { sections } => {
            out.push_str("<dl>");
            for section in sections {
                let _ = write!(
                    out,
                    "<dt>{}</dt><dd>{}</dd>",
                    escape_html(&section.header),
                    render_component(&section.content)
                );
            }
            out.push_str("</dl>");
        }
        Config::FlexLayout { options } => {
            for row in &options.sections {
                for item in row {
                    out.push_str(&render_component(&item.view));
                }
            }
        }
        Config::List { items } => {
            for item in items {
                out.push_str(&render_component(item));
            }
        }
        Config::Editor { value, .. } => {
            let _ = write!(out, "<pre>{}</pre>", escape_html(value));
        }
        Config::ButtonGroup { buttons } => {
            for button in buttons {
                let _ = write!(
                    out,
                    "<button disabled title=\"actions are not wired in the preview\">{}</button>",
                    escape_html(&button.name)
                );
            }
        }
        Config::GridActions { .. } => {}
        Config::Form { fields, .. } => {
            out.push_str("<form>");
            for field in fields {
                if field.field_type == "hidden" {
                    continue;
                }
                let _ = write!(
                    out,
                    "<dt>{}</dt><dd><input name=\"{}\" disabled /></dd>",
                    escape_html(&field.label),
                    escape_html(&field.name)
                );
            }
            out.push_str("</form>");
        }
    }
    out
}

fn escape_html(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '<' => "&lt;".into(),
            '>' => "&gt;".into(),
            '&' => "&amp;".into(),
            '"' => "&quot;".into(),
            '\'' => "&#39;".into(),
            _ => c.to_string(),
        })
        .collect()
}

fn html_response(body: String) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_header(content_type("text/html; charset=utf-8"))
        .with_status_code(StatusCode(200))
}

fn json_response(body: String) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(body)
        .with_header(content_type("application/json"))
        .with_status_code(StatusCode(200))
}

fn error_response(status: u16, err: anyhow::Error) -> Response<std::io::Cursor<Vec<u8>>> {
    let body = json!({ "error": err.to_string() }).to_string();
    Response::from_string(body)
        .with_header(content_type("application/json"))
        .with_status_code(StatusCode(status))
}

fn content_type(value: &str) -> Header {
    Header::from_bytes(&b"Content-Type"[..], value.as_bytes()).unwrap()
}
