use chrono::NaiveDate;
use clap::Subcommand;
use std::sync::Arc;

use crate::cli::utils::{fail, finish_submit, notifier, output_record, show_list};
use crate::cli::{DirectionArg, OutputFormat};
use crate::controller::FormController;
use crate::portal::Portal;
use crate::resources::{OneToOneMeeting, OneToOnes};
use crate::types::{link_display, Direction};

#[derive(Subcommand)]
pub enum MeetingCommands {
    #[command(about = "List meetings you initiated (given) or attended (received)")]
    List {
        #[arg(long, value_enum, default_value_t = DirectionArg::Given)]
        direction: DirectionArg,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    #[command(about = "Show one meeting")]
    Show { id: String },

    #[command(about = "Record a one-to-one meeting")]
    Create {
        #[arg(help = "Member you met")]
        member_id: String,
        #[arg(help = "Where you met")]
        meet_place: String,
        #[arg(help = "Meeting date, YYYY-MM-DD")]
        date: NaiveDate,
        #[arg(long)]
        topics: Option<String>,
        #[arg(long, help = "Uploaded photo path")]
        photo: Option<String>,
    },
}

fn line(meeting: &OneToOneMeeting, user_id: &str) -> String {
    format!(
        "{}  {}  {:<20} {}",
        meeting.id,
        meeting.date,
        link_display(meeting.counterpart(user_id)),
        meeting.meet_place
    )
}

pub async fn handle(cmd: MeetingCommands, portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    let notifier = notifier(&output_format);

    match cmd {
        MeetingCommands::List { direction, page } => {
            let user_id = portal.session().user_id().unwrap_or_default();
            let list = portal.list::<OneToOnes>(notifier, direction.into());
            show_list(&output_format, &list, page, "meetings", |m| line(m, &user_id)).await
        }
        MeetingCommands::Show { id } => match portal.one_to_ones().get(&id).await {
            Ok(meeting) => output_record(&output_format, &meeting),
            Err(e) => fail(&output_format, e),
        },
        MeetingCommands::Create {
            member_id,
            meet_place,
            date,
            topics,
            photo,
        } => {
            let list = Arc::new(portal.list::<OneToOnes>(notifier.clone(), Direction::Given));
            let form = FormController::new(portal.one_to_ones(), list, notifier);
            form.open_create();
            form.edit(|draft| {
                draft.member_id2 = member_id;
                draft.meet_place = meet_place;
                draft.date = date.format("%Y-%m-%d").to_string();
                draft.topics = topics.unwrap_or_default();
                draft.photo = photo.unwrap_or_default();
            });

            finish_submit(&output_format, "meeting", form.submit().await)
        }
    }
}
