use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::error::MergeError;
use crate::normalize::format_date;

/// Contact channels an admin profile can expose. A single text fragment may
/// land in more than one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactChannel {
    Mail,
    Phone,
    Website,
}

pub type ContactInfo = BTreeMap<ContactChannel, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminRecord {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_reviews: Option<u64>,
}

impl AdminRecord {
    /// Bare roster entry from the bulk phase; enrichment fills the rest.
    pub fn bare(id: impl Into<String>, name: impl Into<String>) -> Self {
        AdminRecord {
            id: id.into(),
            name: name.into(),
            contact_info: None,
            average_score: None,
            n_reviews: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostRecord {
    pub user_name: String,
    pub date_posted: String,
    pub text: String,
    pub n_comments: u64,
    pub n_shares: u64,
    pub n_likes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicRecord {
    pub tag: String,
    pub tagged_post_count: u64,
}

/// Everything known about one group. A private group only ever has
/// name/link/description/is_private populated; the rest stays None.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupRecord {
    #[serde(rename = "group_name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub is_private: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "n_members", skip_serializing_if = "Option::is_none")]
    pub members: Option<u64>,
    #[serde(
        rename = "creation_date",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_date"
    )]
    pub creation_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admins: Option<Vec<AdminRecord>>,
    #[serde(
        rename = "daily_posts_frequency",
        skip_serializing_if = "Option::is_none"
    )]
    pub posts_frequency: Option<f64>,
    #[serde(rename = "weekly_new", skip_serializing_if = "Option::is_none")]
    pub weekly_new: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<TopicRecord>>,
    #[serde(rename = "feat", skip_serializing_if = "Option::is_none")]
    pub featured: Option<Vec<PostRecord>>,
}

/// Output of the advanced pipeline, folded into the basic record via
/// [`GroupRecord::merge_advanced`].
#[derive(Debug, Clone)]
pub struct AdvancedInfo {
    pub topics: Vec<TopicRecord>,
    pub featured: Vec<PostRecord>,
    pub admins: Vec<AdminRecord>,
}

impl GroupRecord {
    /// Fold advanced data into this record. Union semantics: a field already
    /// populated by the basic pass may not be overwritten with different data,
    /// and the enriched admin list must cover exactly the bare roster it
    /// replaces.
    pub fn merge_advanced(&mut self, adv: AdvancedInfo) -> Result<(), MergeError> {
        match &self.topics {
            Some(existing) if *existing != adv.topics => {
                return Err(MergeError::Conflict("topics"))
            }
            _ => {}
        }
        match &self.featured {
            Some(existing) if *existing != adv.featured => {
                return Err(MergeError::Conflict("feat"))
            }
            _ => {}
        }
        if let Some(basic) = &self.admins {
            let basic_ids: BTreeSet<&str> = basic.iter().map(|a| a.id.as_str()).collect();
            let enriched_ids: BTreeSet<&str> = adv.admins.iter().map(|a| a.id.as_str()).collect();
            if basic_ids != enriched_ids {
                return Err(MergeError::AdminRosterMismatch);
            }
        }

        self.topics = Some(adv.topics);
        self.featured = Some(adv.featured);
        self.admins = Some(adv.admins);
        Ok(())
    }
}

fn serialize_opt_date<S: Serializer>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(d) => serializer.serialize_str(&format_date(*d)),
        None => serializer.serialize_none(),
    }
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn public_record() -> GroupRecord {
        GroupRecord {
            name: Some("testgroup".into()),
            link: Some("https://www.facebook.com/groups/testgroup/".into()),
            is_private: false,
            description: Some("a description".into()),
            members: Some(1000),
            admins: Some(vec![AdminRecord::bare("100", "Alice")]),
            ..Default::default()
        }
    }

    #[test]
    fn merge_fills_advanced_fields() {
        let mut record = public_record();
        let adv = AdvancedInfo {
            topics: vec![TopicRecord { tag: "#sale".into(), tagged_post_count: 3 }],
            featured: vec![],
            admins: vec![AdminRecord {
                average_score: Some(4.5),
                n_reviews: Some(10),
                ..AdminRecord::bare("100", "Alice")
            }],
        };
        record.merge_advanced(adv).unwrap();
        assert_eq!(record.topics.as_ref().unwrap().len(), 1);
        assert_eq!(record.admins.as_ref().unwrap()[0].average_score, Some(4.5));
    }

    #[test]
    fn merge_rejects_conflicting_topics() {
        let mut record = public_record();
        record.topics = Some(vec![TopicRecord { tag: "#old".into(), tagged_post_count: 1 }]);
        let adv = AdvancedInfo {
            topics: vec![TopicRecord { tag: "#new".into(), tagged_post_count: 2 }],
            featured: vec![],
            admins: vec![AdminRecord::bare("100", "Alice")],
        };
        assert!(matches!(
            record.merge_advanced(adv),
            Err(MergeError::Conflict("topics"))
        ));
    }

    #[test]
    fn merge_rejects_roster_mismatch() {
        let mut record = public_record();
        let adv = AdvancedInfo {
            topics: vec![],
            featured: vec![],
            admins: vec![AdminRecord::bare("999", "Mallory")],
        };
        assert!(matches!(
            record.merge_advanced(adv),
            Err(MergeError::AdminRosterMismatch)
        ));
    }

    #[test]
    fn private_record_serializes_minimal() {
        let record = GroupRecord {
            name: Some("hidden".into()),
            link: Some("https://www.facebook.com/groups/hidden/".into()),
            is_private: true,
            description: Some("desc".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), 4);
        assert!(keys.contains(&"group_name"));
        assert!(keys.contains(&"is_private"));
        assert!(!keys.contains(&"n_members"));
    }

    #[test]
    fn creation_date_renders_day_first() {
        let record = GroupRecord {
            creation_date: NaiveDate::from_ymd_opt(2023, 4, 8),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["creation_date"], "08/04/2023");
    }
}
