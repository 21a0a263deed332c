use forum_store::db::open_db_in_memory;
use forum_store::{
    Comment, CommentRepository, CommentService, EntityRef, NewPost, PostId, PostRepository,
    ReactionDirection, ReactionLedger, ReactionTarget, SqliteCommentRepository,
    SqlitePostRepository, SqliteReactionLedger, StoreError, ValidationError,
};
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().expect("in-memory db should open")
}

fn create_post(conn: &Connection, title: &str) -> PostId {
    SqlitePostRepository::try_new(conn)
        .expect("migrated connection should build post repo")
        .create_post(&NewPost {
            title: title.to_string(),
            description: "body".to_string(),
            author: "alice".to_string(),
            ..NewPost::default()
        })
        .expect("post fixture should be created")
}

fn count_rows(conn: &Connection, sql: &str, id: i64) -> i64 {
    conn.query_row(sql, [id], |row| row.get(0))
        .expect("count query should succeed")
}

#[test]
fn create_and_get_roundtrip_trims_text() {
    let conn = setup();
    let post_id = create_post(&conn, "first");
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();

    let id = repo.create_comment(post_id, "alice", "  nice post \n").unwrap();
    let loaded = repo.get_comment(id).unwrap();

    assert_eq!(loaded.id, id);
    assert_eq!(loaded.post_id, post_id);
    assert_eq!(loaded.author, "alice");
    assert_eq!(loaded.text, "nice post");
    assert_eq!((loaded.likes, loaded.dislikes), (0, 0));
    assert!(loaded.created_at > 0);
    assert!(loaded.found);
}

#[test]
fn create_rejects_blank_text_before_storage() {
    let conn = setup();
    let post_id = create_post(&conn, "first");
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();

    for text in ["", " ", "\t\n"] {
        let err = repo.create_comment(post_id, "alice", text).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::EmptyText { .. })
        ));
    }
    assert!(repo.get_comments_by_post(post_id).unwrap().is_empty());
}

#[test]
fn create_under_missing_post_returns_not_found() {
    let conn = setup();
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();

    let err = repo.create_comment(77, "alice", "orphan").unwrap_err();
    assert!(matches!(err, StoreError::NotFound(EntityRef::Post(77))));
    assert_eq!(
        count_rows(&conn, "SELECT COUNT(*) FROM comment WHERE post_id = ?1;", 77),
        0
    );
}

#[test]
fn comments_by_post_are_in_creation_order_and_scoped() {
    let conn = setup();
    let first_post = create_post(&conn, "first");
    let second_post = create_post(&conn, "second");
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();

    let a = repo.create_comment(first_post, "alice", "one").unwrap();
    let other = repo.create_comment(second_post, "bob", "elsewhere").unwrap();
    let b = repo.create_comment(first_post, "bob", "two").unwrap();
    let c = repo.create_comment(first_post, "carol", "three").unwrap();

    let listed: Vec<_> = repo
        .get_comments_by_post(first_post)
        .unwrap()
        .into_iter()
        .map(|comment| comment.id)
        .collect();
    assert_eq!(listed, vec![a, b, c]);
    assert!(!listed.contains(&other));

    let again: Vec<_> = repo
        .get_comments_by_post(first_post)
        .unwrap()
        .into_iter()
        .map(|comment| comment.id)
        .collect();
    assert_eq!(again, listed);
}

#[test]
fn comments_by_unknown_post_is_empty() {
    let conn = setup();
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();
    assert!(repo.get_comments_by_post(12345).unwrap().is_empty());
}

#[test]
fn listed_comments_do_not_carry_found_flag() {
    let conn = setup();
    let post_id = create_post(&conn, "first");
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();
    repo.create_comment(post_id, "alice", "hello").unwrap();

    let listed = repo.get_comments_by_post(post_id).unwrap();
    assert!(!listed[0].found);
}

#[test]
fn get_missing_comment_returns_not_found() {
    let conn = setup();
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();

    let err = repo.get_comment(9999).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(EntityRef::Comment(9999))));
}

#[test]
fn update_replaces_text_only() {
    let conn = setup();
    let post_id = create_post(&conn, "first");
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();
    let id = repo.create_comment(post_id, "alice", "draft").unwrap();
    let before = repo.get_comment(id).unwrap();

    let mut edited = before.clone();
    edited.text = "  final  ".to_string();
    edited.author = "mallory".to_string();
    edited.likes = 100;
    repo.update_comment(&edited).unwrap();

    let after = repo.get_comment(id).unwrap();
    assert_eq!(after.text, "final");
    assert_eq!(after.author, before.author);
    assert_eq!(after.likes, before.likes);
    assert_eq!(after.created_at, before.created_at);
}

#[test]
fn update_missing_comment_returns_not_found() {
    let conn = setup();
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();

    let err = repo
        .update_comment(&Comment::text_update(9999, "x"))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(EntityRef::Comment(9999))));
}

#[test]
fn update_with_blank_text_is_rejected_and_keeps_row() {
    let conn = setup();
    let post_id = create_post(&conn, "first");
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();
    let id = repo.create_comment(post_id, "alice", "keep me").unwrap();

    let err = repo
        .update_comment(&Comment::text_update(id, "   "))
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
    assert_eq!(repo.get_comment(id).unwrap().text, "keep me");
}

#[test]
fn delete_missing_comment_returns_not_found() {
    let conn = setup();
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();

    let err = repo.delete_comment(31337).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(EntityRef::Comment(31337))));
}

#[test]
fn deleted_comment_ids_are_not_reused() {
    let conn = setup();
    let post_id = create_post(&conn, "first");
    let repo = SqliteCommentRepository::try_new(&conn).unwrap();

    let first = repo.create_comment(post_id, "alice", "one").unwrap();
    repo.delete_comment(first).unwrap();
    let second = repo.create_comment(post_id, "alice", "two").unwrap();

    assert!(second > first);
    assert!(matches!(
        repo.get_comment(first),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn like_switch_then_delete_scenario() {
    let conn = setup();
    let post_id = create_post(&conn, "scenario");
    let service = CommentService::new(
        SqliteCommentRepository::try_new(&conn).unwrap(),
        SqliteReactionLedger::try_new(&conn).unwrap(),
    );

    let comment_id = service
        .create_comment(post_id, "alice", "nice post")
        .unwrap();

    let counts = service
        .react(2, comment_id, ReactionDirection::Like)
        .unwrap();
    assert_eq!((counts.likes, counts.dislikes), (1, 0));

    let counts = service
        .react(2, comment_id, ReactionDirection::Dislike)
        .unwrap();
    assert_eq!((counts.likes, counts.dislikes), (0, 1));

    let stored = service.get_comment(comment_id).unwrap();
    assert_eq!((stored.likes, stored.dislikes), (0, 1));

    service.delete_comment(comment_id).unwrap();

    let err = service.get_comment(comment_id).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(EntityRef::Comment(id)) if id == comment_id));

    let ledger = SqliteReactionLedger::try_new(&conn).unwrap();
    assert_eq!(
        ledger
            .get_reaction(2, ReactionTarget::Comment(comment_id))
            .unwrap(),
        None
    );
    assert_eq!(
        count_rows(
            &conn,
            "SELECT COUNT(*) FROM reaction WHERE comment_id = ?1;",
            comment_id
        ),
        0
    );
}

#[test]
fn service_edit_text_returns_stored_row() {
    let conn = setup();
    let post_id = create_post(&conn, "first");
    let service = CommentService::new(
        SqliteCommentRepository::try_new(&conn).unwrap(),
        SqliteReactionLedger::try_new(&conn).unwrap(),
    );
    let id = service.create_comment(post_id, "alice", "draft").unwrap();

    let edited = service.edit_text(id, " edited ").unwrap();
    assert_eq!(edited.text, "edited");
    assert_eq!(edited.author, "alice");
    assert_eq!(service.get_comments_by_post(post_id).unwrap().len(), 1);
}
