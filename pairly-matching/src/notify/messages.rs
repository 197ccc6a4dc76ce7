use super::Content;
use crate::models::{Interest, Profile};

/// How to reach a user: their public alias when set, otherwise a numeric-id deep link.
pub fn contact_line(profile: &Profile) -> String {
    match profile.alias.as_deref() {
        Some(alias) => format!("@{alias} (https://t.me/{alias})"),
        None => format!("tg://user?id={}", profile.user_id),
    }
}

/// Sent to each side of a new mutual match, describing the other side.
pub fn match_announcement(partner: &Profile) -> Content {
    Content::Photo {
        handle: partner.photo_id.clone(),
        caption: format!(
            "It's a match! You and {name} liked each other.\n\n{name}, {age}\n{description}\n\nContact: {contact}",
            name = partner.name,
            age = partner.age,
            description = partner.description,
            contact = contact_line(partner),
        ),
    }
}

pub fn liked_by(liker: &Profile) -> Content {
    Content::Text(format!(
        "{} liked you! Open \"who liked me\" to see the profile and reply.",
        liker.name
    ))
}

fn tag_names(tags: &[Interest]) -> String {
    tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>().join(", ")
}

pub fn broadcast_review(broadcast_id: i32, sender: &Profile, body: &str, tags: &[Interest]) -> Content {
    Content::Text(format!(
        "Broadcast #{broadcast_id} from {} ({}):\n{body}\n\nInterests: {}",
        sender.name,
        contact_line(sender),
        tag_names(tags),
    ))
}

pub fn broadcast_delivery(sender: &Profile, body: &str) -> Content {
    Content::Text(format!("{body}\n\nWrite to the author: {}", contact_line(sender)))
}
