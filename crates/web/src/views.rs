//! Display data for templates.
//!
//! Templates only see plain strings and numbers; everything that needs
//! formatting happens here.

use chrono::{DateTime, Utc};

use threewords_core::{CloudEntry, build_word_cloud};

use crate::models::{Profile, WordSubmission};

/// Tweet text used by the share link.
const SHARE_TEXT: &str = "Describe me in three words!";

/// Profile header data.
#[derive(Clone)]
pub struct ProfileView {
    pub username: String,
    pub display_name: String,
    pub avatar_url: String,
    pub profile_url: String,
    pub share_url: String,
}

impl ProfileView {
    #[must_use]
    pub fn new(profile: &Profile, profile_url: String) -> Self {
        let share_url = format!(
            "https://twitter.com/intent/tweet?text={}&url={}",
            urlencoding::encode(SHARE_TEXT),
            urlencoding::encode(&profile_url)
        );

        Self {
            username: profile.username.to_string(),
            display_name: profile.display_name.clone(),
            avatar_url: profile.avatar(),
            profile_url,
            share_url,
        }
    }
}

/// One word in the rendered cloud.
#[derive(Clone)]
pub struct CloudWordView {
    pub word: String,
    /// CSS class selecting one of four font sizes.
    pub size_class: String,
    /// Hover text, e.g. "3 times".
    pub title: String,
}

impl From<CloudEntry> for CloudWordView {
    fn from(entry: CloudEntry) -> Self {
        Self {
            size_class: format!("cloud-size-{}", entry.bucket),
            title: entry.times_label(),
            word: entry.word,
        }
    }
}

/// Build the cloud for a submission history.
#[must_use]
pub fn cloud_words(submissions: &[WordSubmission]) -> Vec<CloudWordView> {
    build_word_cloud(submissions)
        .into_iter()
        .map(CloudWordView::from)
        .collect()
}

/// One row in the recent submissions list.
#[derive(Clone)]
pub struct SubmissionView {
    pub words: [String; 3],
    pub attribution: String,
    pub time_ago: String,
}

impl SubmissionView {
    #[must_use]
    pub fn new(submission: &WordSubmission, now: DateTime<Utc>) -> Self {
        Self {
            words: [
                submission.word1.clone(),
                submission.word2.clone(),
                submission.word3.clone(),
            ],
            attribution: submission.attribution().to_string(),
            time_ago: format!("{} ago", distance_in_words(submission.created_at, now)),
        }
    }
}

/// Approximate human distance between two instants, e.g. "5 minutes".
#[must_use]
pub fn distance_in_words(from: DateTime<Utc>, to: DateTime<Utc>) -> String {
    const MINUTE: i64 = 60;
    const HOUR: i64 = 60 * MINUTE;
    const DAY: i64 = 24 * HOUR;
    const MONTH: i64 = 30 * DAY;

    let seconds = (to - from).num_seconds().abs();
    let rounded = |unit: i64| (seconds + unit / 2) / unit;

    if seconds < 30 {
        return "less than a minute".to_string();
    }
    if seconds < 90 {
        return "1 minute".to_string();
    }
    if seconds < 44 * MINUTE + 30 {
        return format!("{} minutes", rounded(MINUTE));
    }
    if seconds < 89 * MINUTE + 30 {
        return "about 1 hour".to_string();
    }
    if seconds < DAY - 30 {
        return format!("about {} hours", rounded(HOUR));
    }
    if seconds < 42 * HOUR - 30 {
        return "1 day".to_string();
    }
    if seconds < MONTH - 30 {
        return format!("{} days", rounded(DAY));
    }
    if seconds < 45 * DAY - 30 {
        return "about 1 month".to_string();
    }
    if seconds < 60 * DAY - 30 {
        return "about 2 months".to_string();
    }

    let months = rounded(MONTH);
    if months < 12 {
        return format!("{months} months");
    }

    let years = months / 12;
    let remainder = months % 12;
    let plural = |n: i64| if n == 1 { "year" } else { "years" };
    if remainder < 3 {
        format!("about {years} {}", plural(years))
    } else if remainder < 9 {
        format!("over {years} {}", plural(years))
    } else {
        format!("almost {} years", years + 1)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;

    use threewords_core::{ProfileId, SubmissionId, Username};

    use super::*;

    fn ago(seconds: i64) -> String {
        let now = Utc::now();
        distance_in_words(now - Duration::seconds(seconds), now)
    }

    #[test]
    fn test_distance_in_words() {
        assert_eq!(ago(5), "less than a minute");
        assert_eq!(ago(60), "1 minute");
        assert_eq!(ago(5 * 60), "5 minutes");
        assert_eq!(ago(60 * 60), "about 1 hour");
        assert_eq!(ago(3 * 60 * 60), "about 3 hours");
        assert_eq!(ago(30 * 60 * 60), "1 day");
        assert_eq!(ago(5 * 24 * 60 * 60), "5 days");
        assert_eq!(ago(40 * 24 * 60 * 60), "about 1 month");
        assert_eq!(ago(120 * 24 * 60 * 60), "4 months");
        assert_eq!(ago(400 * 24 * 60 * 60), "about 1 year");
    }

    #[test]
    fn test_share_url() {
        let profile = Profile {
            id: ProfileId::new(1),
            username: Username::parse("alice").unwrap(),
            display_name: "Alice".to_string(),
            avatar_url: None,
            created_at: Utc::now(),
        };
        let view = ProfileView::new(&profile, "https://3w.example/u/alice".to_string());

        assert_eq!(
            view.share_url,
            "https://twitter.com/intent/tweet?text=Describe%20me%20in%20three%20words%21\
             &url=https%3A%2F%2F3w.example%2Fu%2Falice"
        );
        assert_eq!(
            view.avatar_url,
            "https://api.dicebear.com/7.x/avataaars/svg?seed=alice"
        );
    }

    #[test]
    fn test_cloud_words_classes() {
        let submission = |id, words: [&str; 3]| WordSubmission {
            id: SubmissionId::new(id),
            profile_id: ProfileId::new(1),
            submitter_name: None,
            word1: words[0].to_string(),
            word2: words[1].to_string(),
            word3: words[2].to_string(),
            anonymous: false,
            created_at: Utc::now(),
        };
        let cloud = cloud_words(&[
            submission(1, ["Cat", "Dog", "Cat"]),
            submission(2, ["cat", "Bird", "Dog"]),
        ]);

        let rendered: Vec<(&str, &str, &str)> = cloud
            .iter()
            .map(|w| (w.word.as_str(), w.size_class.as_str(), w.title.as_str()))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("cat", "cloud-size-4", "3 times"),
                ("dog", "cloud-size-3", "2 times"),
                ("bird", "cloud-size-2", "1 time"),
            ]
        );
    }
}
