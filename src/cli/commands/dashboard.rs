use clap::Subcommand;

use crate::cli::utils::{fail, output_page, output_record, output_success};
use crate::cli::OutputFormat;
use crate::controller::page_window;
use crate::portal::Portal;
use crate::types::link_display;

#[derive(Subcommand)]
pub enum DashboardCommands {
    #[command(about = "Referral, TYFCB and meeting totals")]
    Counts,

    #[command(about = "Next upcoming chapter event")]
    Event,

    #[command(about = "Profile completion")]
    Profile,

    #[command(about = "Notifications")]
    Notifications {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    #[command(about = "Testimonials written for you")]
    Testimonials {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

pub async fn handle(cmd: DashboardCommands, portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    let dashboard = portal.dashboard();
    let limit = portal.config().pagination.page_size;
    let radius = portal.config().pagination.window_radius;

    match cmd {
        DashboardCommands::Counts => match dashboard.counts().await {
            Ok(counts) => output_record(&output_format, &counts),
            Err(e) => fail(&output_format, e),
        },
        DashboardCommands::Event => match dashboard.next_event().await {
            Ok(Some(event)) => output_record(&output_format, &event),
            Ok(None) => output_success(&output_format, "No upcoming events", None),
            Err(e) => fail(&output_format, e),
        },
        DashboardCommands::Profile => match dashboard.profile_completion().await {
            Ok(profile) => output_record(&output_format, &profile),
            Err(e) => fail(&output_format, e),
        },
        DashboardCommands::Notifications { page } => match dashboard.notifications(page, limit).await {
            Ok(notifications) => {
                let window = page_window(notifications.current_page, notifications.total_pages, radius);
                output_page(&output_format, "notifications", &notifications, &window, |n| {
                    let marker = if n.is_read { " " } else { "*" };
                    format!("{} {}  {}", marker, n.title, n.message)
                })
            }
            Err(e) => fail(&output_format, e),
        },
        DashboardCommands::Testimonials { page } => match dashboard.testimonials(page, limit).await {
            Ok(testimonials) => {
                let window = page_window(testimonials.current_page, testimonials.total_pages, radius);
                output_page(&output_format, "testimonials", &testimonials, &window, |t| {
                    format!("{:<20} {}", link_display(t.giver_id.as_ref()), t.message)
                })
            }
            Err(e) => fail(&output_format, e),
        },
    }
}
