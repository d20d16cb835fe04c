diesel::table! {
    videos (id) {
        id -> Uuid,
        title -> Varchar,
        video_id -> Varchar,
        thumbnail -> Nullable<Varchar>,
        live -> Bool,
        created_at -> Timestamp,
        updated_at -> Nullable<Timestamp>,
    }
}
