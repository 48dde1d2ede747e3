use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::api::Page;
use crate::cli::OutputFormat;
use crate::controller::{FetchOutcome, ListController, PagedSource, SubmitOutcome};
use crate::error::PortalError;
use crate::notifier::{ConsoleNotifier, Notifier, TracingNotifier};

/// Command failure whose message is already on screen; `main` exits without repeating it
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(pub String);

/// Notices go to the terminal in text mode and to the log in JSON mode
pub fn notifier(output_format: &OutputFormat) -> Arc<dyn Notifier> {
    match output_format {
        OutputFormat::Text => Arc::new(ConsoleNotifier),
        OutputFormat::Json => Arc::new(TracingNotifier),
    }
}

/// JSON output mirrors the backend envelope: `{ success, message, data }`
fn print_envelope(success: bool, message: Option<&str>, fields: Value) -> anyhow::Result<()> {
    let mut response = json!({ "success": success });
    if let Some(message) = message {
        response["message"] = json!(message);
    }
    if let (Value::Object(extra), Some(target)) = (fields, response.as_object_mut()) {
        target.extend(extra);
    }
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Confirmation line, with optional `data` in JSON mode
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => match data {
            Some(data) => print_envelope(true, Some(message), json!({ "data": data })),
            None => print_envelope(true, Some(message), Value::Null),
        },
        OutputFormat::Text => {
            println!("✓ {}", message);
            Ok(())
        }
    }
}

/// Prints a failure once and hands back the error `main` will not print again
pub fn output_error(output_format: &OutputFormat, message: &str, code: Option<&str>) -> anyhow::Error {
    let printed = match output_format {
        OutputFormat::Json => print_envelope(false, Some(message), json!({ "code": code })),
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
            Ok(())
        }
    };
    match printed {
        Ok(()) => Reported(message.to_string()).into(),
        Err(e) => e,
    }
}

pub fn fail(output_format: &OutputFormat, err: PortalError) -> anyhow::Result<()> {
    Err(output_error(output_format, &err.user_message(), Some(err.error_code())))
}

/// Output one page of a collection, one line per item in text mode
pub fn output_page<T: Serialize>(
    output_format: &OutputFormat,
    collection_name: &str,
    page: &Page<T>,
    window: &[u32],
    line: impl Fn(&T) -> String,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => print_envelope(
            true,
            None,
            json!({
                "data": page.items,
                "totalDocs": page.total_items,
                "totalPages": page.total_pages,
                "page": page.current_page,
                "hasPrevPage": page.has_prev,
                "hasNextPage": page.has_next,
            }),
        ),
        OutputFormat::Text if page.is_empty() => {
            if page.current_page > 1 {
                println!("No {} on page {}", collection_name, page.current_page);
            } else {
                println!("No {} yet", collection_name);
            }
            Ok(())
        }
        OutputFormat::Text => {
            for item in &page.items {
                println!("{}", line(item));
            }
            let pages: Vec<String> = window
                .iter()
                .map(|p| if *p == page.current_page { format!("[{}]", p) } else { p.to_string() })
                .collect();
            println!(
                "\nPage {} of {} ({} {})  {}",
                page.current_page,
                page.total_pages,
                page.total_items,
                collection_name,
                pages.join(" ")
            );
            Ok(())
        }
    }
}

/// Output a single record; text mode prints it as indented JSON
pub fn output_record<T: Serialize>(output_format: &OutputFormat, record: &T) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => print_envelope(true, None, json!({ "data": record })),
        OutputFormat::Text => {
            println!("{}", serde_json::to_string_pretty(record)?);
            Ok(())
        }
    }
}

/// Failure already announced by the controller's notifier in text mode
fn list_failure<S: PagedSource>(output_format: &OutputFormat, list: &ListController<S>) -> anyhow::Error {
    let message = list
        .snapshot()
        .last_error
        .unwrap_or_else(|| "Request failed".to_string());
    match output_format {
        OutputFormat::Json => output_error(output_format, &message, None),
        OutputFormat::Text => {
            eprintln!("  {}", message);
            Reported(message).into()
        }
    }
}

/// Loads `page` through the controller and prints whatever it ends up showing
pub async fn show_list<S>(
    output_format: &OutputFormat,
    list: &ListController<S>,
    page: u32,
    collection_name: &str,
    line: impl Fn(&S::Item) -> String,
) -> anyhow::Result<()>
where
    S: PagedSource,
    S::Item: Serialize,
{
    if list.load().await != FetchOutcome::Loaded {
        return Err(list_failure(output_format, list));
    }
    if page > 1 {
        match list.go_to_page(page).await {
            None => {
                let total = list.snapshot().collection.total_pages;
                let message = format!("Page {} is out of range (1-{})", page, total);
                return Err(output_error(output_format, &message, None));
            }
            Some(FetchOutcome::Loaded) => {}
            Some(_) => return Err(list_failure(output_format, list)),
        }
    }

    let snapshot = list.snapshot();
    output_page(output_format, collection_name, &snapshot.collection, &list.page_window(), line)
}

/// Maps a form submission to the command result; the form has already
/// reported failures through its notifier
pub fn finish_submit<T: Serialize>(
    output_format: &OutputFormat,
    record_name: &str,
    outcome: SubmitOutcome<T>,
) -> anyhow::Result<()> {
    let err = match outcome {
        SubmitOutcome::Saved(Some(record)) => {
            return match output_format {
                OutputFormat::Json => output_record(output_format, &record),
                OutputFormat::Text => Ok(()),
            };
        }
        SubmitOutcome::Saved(None) => {
            return match output_format {
                OutputFormat::Json => print_envelope(true, Some(&format!("{} saved", record_name)), Value::Null),
                OutputFormat::Text => Ok(()),
            };
        }
        SubmitOutcome::Ignored => anyhow::bail!("A submission is already in progress"),
        SubmitOutcome::Invalid(errors) => {
            for (field, message) in &errors.field_errors {
                eprintln!("  {}: {}", field, message);
            }
            PortalError::Validation(errors)
        }
        SubmitOutcome::Failed(err) => err,
    };

    match output_format {
        OutputFormat::Json => fail(output_format, err),
        OutputFormat::Text => Err(Reported(err.user_message()).into()),
    }
}
