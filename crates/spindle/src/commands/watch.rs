//! Live view: keep the controller polling and render every snapshot
//! replacement until Ctrl-C.

use spindle_core::ArrayController;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(controller: &ArrayController, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    controller.activate().await;
    let mut status_rx = controller.subscribe_status();

    if !global.quiet {
        eprintln!("Watching arrays (Ctrl-C to stop)");
    }

    // Render whatever activation produced before waiting for changes.
    render(&status_rx.borrow_and_update().clone(), color);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = status_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                render(&status_rx.borrow_and_update().clone(), color);
            }
        }
    }

    // Deterministic teardown: no poll timer survives the view.
    controller.deactivate().await;
    Ok(())
}

fn render(snapshot: &Option<std::sync::Arc<spindle_core::StatusSnapshot>>, color: bool) {
    let Some(snapshot) = snapshot else { return };
    let stamp = snapshot.captured_at.format("%H:%M:%S");
    for array in &snapshot.arrays {
        let progress = array
            .resync_progress
            .map_or_else(String::new, |p| format!("  {p:.1}%"));
        println!(
            "{stamp}  {:<12} {:<8} {}{progress}",
            array.name,
            array.level,
            output::paint_status(&array.status, color),
        );
    }
}
