use crate::domain::model::Post;
use serde::{Deserialize, Serialize};

/// Section labels of a rendered post, in the target language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostTemplate {
    pub title_label: String,
    pub summary_label: String,
    pub source_label: String,
}

impl Default for PostTemplate {
    fn default() -> Self {
        Self {
            title_label: "শিরোনাম".to_string(),
            summary_label: "সংক্ষেপ".to_string(),
            source_label: "সূত্র".to_string(),
        }
    }
}

impl PostTemplate {
    pub fn render(&self, post: &Post) -> String {
        let mut message = format!("📰 {}: {}\n\n", self.title_label, post.title);

        if !post.fragments.is_empty() {
            message.push_str(&format!("📌 {}:\n", self.summary_label));
            for fragment in &post.fragments {
                message.push_str(&format!("- {}\n", fragment));
            }
            message.push('\n');
        }

        message.push_str(&format!("🔗 {}: {}", self.source_label, post.link));
        message
    }
}
