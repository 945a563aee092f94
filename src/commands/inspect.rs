use anyhow::Result;
use tracing::info;

use crate::commands::utils::{self, BrowserOpts, FrameOpts};
use crate::types::OutputFormat;

pub async fn handle_inspect(
    url: String,
    root: Option<String>,
    browser_opts: BrowserOpts,
    frame_opts: FrameOpts,
) -> Result<()> {
    let frame = utils::frame_target(&frame_opts)?;
    info!("Inspecting {} (root: {:?})", url, root);

    let (_driver, browser) = utils::open_browser(&browser_opts).await?;
    utils::navigate_if_given(&browser, &url).await?;

    let inspection = browser.inspect(&frame, root.as_deref()).await?;
    browser.close().await?;

    match browser_opts.format {
        OutputFormat::Json => utils::print_json(&inspection)?,
        OutputFormat::Simple => {
            println!(
                "{}: {} clickable, {} fields, {} controls, {} iframes",
                inspection.url,
                inspection.clickable_elements.len(),
                inspection.form_fields.len(),
                inspection.interactive_controls.len(),
                inspection.iframes.len()
            );
            for el in &inspection.clickable_elements {
                println!(
                    "  [{}] {}{}",
                    el.effective_role,
                    el.accessible_name.as_deref().unwrap_or("(unnamed)"),
                    if el.visible { "" } else { " (hidden)" }
                );
            }
            for field in &inspection.form_fields {
                println!(
                    "  [field:{}] {}",
                    field.field_type,
                    field.accessible_name.as_deref().unwrap_or("(unnamed)")
                );
            }
            for control in &inspection.interactive_controls {
                println!(
                    "  [{}] {}{}",
                    control.control_type,
                    control.accessible_name.as_deref().unwrap_or("(unnamed)"),
                    match control.checked {
                        Some(true) => " [checked]",
                        Some(false) => " [unchecked]",
                        None => "",
                    }
                );
            }
        }
    }
    Ok(())
}
