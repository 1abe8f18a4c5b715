//! Discord message composition
//!
//! Renders the top of a report as Discord markdown, kept below the
//! platform's 2000 character message limit.

use std::fmt::Write as _;

use prformance_api::domain::entities::{ContributionKind, ContributorProfile, Report};

/// Contributors listed in one message
pub const TOP_CONTRIBUTORS: usize = 10;

/// Content length kept before truncation, leaving room for the marker
pub const MAX_MESSAGE_CHARS: usize = 1950;

const TRUNCATION_MARKER: &str = "...\n(message truncated)";

fn position_emoji(index: usize) -> &'static str {
    match index {
        0 => "🥇",
        1 => "🥈",
        2 => "🥉",
        _ => "🔸",
    }
}

/// Non-zero counts for `kinds`, joined on one line
fn count_line(dev: &ContributorProfile, kinds: &[(ContributionKind, &str, &str)]) -> Option<String> {
    let parts: Vec<String> = kinds
        .iter()
        .filter_map(|(kind, emoji, noun)| {
            let n = dev.contributions.count(*kind);
            (n > 0).then(|| format!("{} {} {}", emoji, n, noun))
        })
        .collect();

    (!parts.is_empty()).then(|| parts.join(" | "))
}

fn write_contributor(message: &mut String, index: usize, dev: &ContributorProfile) {
    let heading = format!(
        "{} {}. {} ({} pts)",
        position_emoji(index),
        index + 1,
        dev.username,
        dev.score
    );
    if index < 3 {
        let _ = writeln!(message, "### {}", heading);
    } else {
        let _ = writeln!(message, "**{}**", heading);
    }

    let lines = [
        count_line(
            dev,
            &[
                (ContributionKind::Commits, "📝", "commits"),
                (ContributionKind::PullRequestsOpened, "🔀", "PRs"),
                (ContributionKind::PullRequestsReviewed, "👀", "reviews"),
            ],
        ),
        count_line(
            dev,
            &[
                (ContributionKind::IssuesOpened, "🐛", "issues"),
                (ContributionKind::IssuesClosed, "✅", "closed"),
                (ContributionKind::PrComments, "💬", "comments"),
            ],
        ),
    ];
    for line in lines.into_iter().flatten() {
        let _ = writeln!(message, "{}", line);
    }
    message.push('\n');
}

/// Cut `message` to [`MAX_MESSAGE_CHARS`] characters and mark it truncated
fn truncate(message: String) -> String {
    match message.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((cut, _)) => format!("{}{}", &message[..cut], TRUNCATION_MARKER),
        None => message,
    }
}

pub fn format_ranking(report: &Report) -> String {
    if report.is_empty() {
        return format!(
            "🔍 **No contributors found between {} and {}!**",
            report.range.start(),
            report.range.end()
        );
    }

    let mut message = String::from("# 🏆 Performance Ranking\n");
    let _ = writeln!(message, "## {} to {}\n", report.range.start(), report.range.end());

    for (index, dev) in report.top(TOP_CONTRIBUTORS).iter().enumerate() {
        write_contributor(&mut message, index, dev);
    }

    if report.developers.len() > TOP_CONTRIBUTORS {
        let _ = writeln!(
            message,
            "_...and {} more. Keep coding!_ 💪\n",
            report.developers.len() - TOP_CONTRIBUTORS
        );
    }
    message.push_str("🎉 **Congratulations everyone!** See you at the next ranking!\n");

    truncate(message)
}
