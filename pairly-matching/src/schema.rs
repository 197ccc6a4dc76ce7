// Mirrors migrations/0001_init.sql.

diesel::table! {
    profiles (user_id) {
        user_id -> BigInt,
        name -> Text,
        age -> Integer,
        description -> Text,
        photo_id -> Text,
        gender -> Text,
        seeking -> Text,
        city -> Nullable<Text>,
        alias -> Nullable<Text>,
        created_at -> Timestamp,
        last_active -> Timestamp,
    }
}

diesel::table! {
    interests (id) {
        id -> Integer,
        name -> Text,
    }
}

diesel::table! {
    user_interests (user_id, interest_id) {
        user_id -> BigInt,
        interest_id -> Integer,
    }
}

diesel::table! {
    likes (id) {
        id -> Integer,
        liker_id -> BigInt,
        liked_id -> BigInt,
        created_at -> Timestamp,
    }
}

diesel::table! {
    viewed_profiles (viewer_id, viewed_id) {
        viewer_id -> BigInt,
        viewed_id -> BigInt,
        viewed_at -> Timestamp,
    }
}

diesel::table! {
    blocks (blocker_id, blocked_id) {
        blocker_id -> BigInt,
        blocked_id -> BigInt,
        reason -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    reports (reporter_id, reported_id) {
        reporter_id -> BigInt,
        reported_id -> BigInt,
        reason -> Nullable<Text>,
        created_at -> Timestamp,
    }
}

diesel::table! {
    matches (user_low, user_high) {
        user_low -> BigInt,
        user_high -> BigInt,
        matched_at -> Timestamp,
    }
}

diesel::table! {
    browse_sessions (viewer_id) {
        viewer_id -> BigInt,
        shortlist -> Text,
        cursor -> Integer,
        started_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    pending_replies (viewer_id) {
        viewer_id -> BigInt,
        liker_id -> BigInt,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    broadcasts (id) {
        id -> Integer,
        sender_id -> BigInt,
        body -> Text,
        interest_ids -> Text,
        status -> Text,
        created_at -> Timestamp,
        decided_at -> Nullable<Timestamp>,
    }
}

diesel::joinable!(user_interests -> profiles (user_id));
diesel::joinable!(user_interests -> interests (interest_id));
diesel::joinable!(likes -> profiles (liker_id));

diesel::allow_tables_to_appear_in_same_query!(
    profiles,
    interests,
    user_interests,
    likes,
    viewed_profiles,
    blocks,
    reports,
    matches,
    browse_sessions,
    pending_replies,
    broadcasts,
);
