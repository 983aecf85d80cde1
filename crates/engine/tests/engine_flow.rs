use domain::{
    thread, Actor, AppCommand, BanTarget, ChapterId, Comment, ContentModerator, EngineError,
    IngestEvent, ReactionKind, Role,
};
use engine::{EngineReply, Executor};
use storage::Db;
use tokio::sync::broadcast;

const CHAPTER: &str = "solo-leveling-110";

async fn setup() -> (Executor, Db) {
    let db = Db::new("sqlite::memory:").await.expect("in-memory db");
    db.ensure_chapter(CHAPTER, "solo-leveling", "الفصل 110")
        .await
        .unwrap();
    db.upsert_profile("u-user", "قارئ", Role::User).await.unwrap();
    db.upsert_profile("u-elite", "مقاتل", Role::EliteFighter)
        .await
        .unwrap();
    db.upsert_profile("u-tribe", "زعيم", Role::TribeLeader)
        .await
        .unwrap();
    db.upsert_profile("u-admin", "مشرف", Role::Admin).await.unwrap();
    db.upsert_profile("u-site", "مدير", Role::SiteAdmin)
        .await
        .unwrap();

    let (tx, _rx) = broadcast::channel(64);
    let executor = Executor::new(db.clone(), ContentModerator::with_defaults(), tx);
    (executor, db)
}

fn chapter_id() -> ChapterId {
    ChapterId::new(CHAPTER).unwrap()
}

fn create_cmd(actor: Actor, body: &str, parent_id: Option<String>) -> AppCommand {
    AppCommand::CreateComment {
        chapter_id: chapter_id(),
        actor,
        body: body.to_string(),
        parent_id,
        is_spoiler: false,
    }
}

fn as_comment(reply: EngineReply) -> Comment {
    match reply {
        EngineReply::Comment(c) => c,
        other => panic!("expected comment reply, got {other:?}"),
    }
}

#[tokio::test]
async fn mild_word_is_created_with_filtered_body() {
    let (executor, db) = setup().await;

    let reply = executor
        .execute(create_cmd(Actor::User("u-user".into()), "أحمق", None))
        .await
        .unwrap();
    let comment = as_comment(reply);
    assert_eq!(comment.body, "***");
    assert!(!comment.is_spoiler);
    assert!(!comment.needs_review);

    let listing = db.list_active_comments(CHAPTER).await.unwrap();
    let threads = thread::build_threads(listing);
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0].comment.id, comment.id);
}

#[tokio::test]
async fn severe_content_blocks_creation_entirely() {
    let (executor, db) = setup().await;

    let result = executor
        .execute(create_cmd(
            Actor::User("u-user".into()),
            "اقتل نفسك الآن",
            None,
        ))
        .await;
    assert!(matches!(result, Err(EngineError::Validation(_))));
    assert!(db.list_active_comments(CHAPTER).await.unwrap().is_empty());
}

#[tokio::test]
async fn moderate_content_lands_in_review_queue() {
    let (executor, db) = setup().await;

    let comment = as_comment(
        executor
            .execute(create_cmd(Actor::User("u-user".into()), "يا حقير", None))
            .await
            .unwrap(),
    );
    assert!(comment.needs_review);

    let queue = db.review_queue().await.unwrap();
    assert_eq!(queue.len(), 1);

    // View access is not enough to resolve.
    let denied = executor
        .execute(AppCommand::ResolveReview {
            comment_id: comment.id.clone(),
            actor: Actor::User("u-elite".into()),
        })
        .await;
    assert!(matches!(denied, Err(EngineError::PermissionDenied(_))));

    executor
        .execute(AppCommand::ResolveReview {
            comment_id: comment.id,
            actor: Actor::User("u-tribe".into()),
        })
        .await
        .unwrap();
    assert!(db.review_queue().await.unwrap().is_empty());
}

#[tokio::test]
async fn elite_fighter_may_delete_another_users_comment() {
    let (executor, db) = setup().await;

    let comment = as_comment(
        executor
            .execute(create_cmd(Actor::User("u-user".into()), "فصل ممتع", None))
            .await
            .unwrap(),
    );

    executor
        .execute(AppCommand::DeleteComment {
            comment_id: comment.id.clone(),
            actor: Actor::User("u-elite".into()),
            reason: Some("مخالف للقوانين".into()),
        })
        .await
        .unwrap();

    let stored = db.get_comment(&comment.id).await.unwrap().unwrap();
    assert!(stored.is_deleted);
    assert_eq!(stored.deleted_by.as_deref(), Some("u-elite"));
    assert_eq!(stored.deleted_reason.as_deref(), Some("مخالف للقوانين"));
    assert!(db.list_active_comments(CHAPTER).await.unwrap().is_empty());

    // The audit projection still carries the tombstone.
    assert_eq!(db.list_all_comments(CHAPTER).await.unwrap().len(), 1);
}

#[tokio::test]
async fn regular_user_cannot_delete_another_users_comment() {
    let (executor, _db) = setup().await;

    let comment = as_comment(
        executor
            .execute(create_cmd(Actor::User("u-elite".into()), "رأيي الخاص", None))
            .await
            .unwrap(),
    );

    let result = executor
        .execute(AppCommand::DeleteComment {
            comment_id: comment.id,
            actor: Actor::User("u-user".into()),
            reason: None,
        })
        .await;
    assert!(matches!(result, Err(EngineError::PermissionDenied(_))));
}

#[tokio::test]
async fn owner_self_deletion_drops_the_reason() {
    let (executor, db) = setup().await;

    let comment = as_comment(
        executor
            .execute(create_cmd(Actor::User("u-user".into()), "سأحذف هذا", None))
            .await
            .unwrap(),
    );

    executor
        .execute(AppCommand::DeleteComment {
            comment_id: comment.id.clone(),
            actor: Actor::User("u-user".into()),
            reason: Some("لن يُحفظ".into()),
        })
        .await
        .unwrap();

    let stored = db.get_comment(&comment.id).await.unwrap().unwrap();
    assert!(stored.is_deleted);
    assert_eq!(stored.deleted_reason, None);
}

#[tokio::test]
async fn permanently_banned_actor_cannot_create() {
    let (executor, db) = setup().await;

    db.insert_ban(
        "ban-1",
        &BanTarget::User("u-user".into()),
        Some("spam".into()),
        None,
        "u-admin",
    )
    .await
    .unwrap();

    let result = executor
        .execute(create_cmd(Actor::User("u-user".into()), "تعليق عادي", None))
        .await;
    assert!(matches!(result, Err(EngineError::Banned)));
    assert!(db.list_active_comments(CHAPTER).await.unwrap().is_empty());
}

#[tokio::test]
async fn new_reaction_replaces_the_previous_one() {
    let (executor, db) = setup().await;

    let comment = as_comment(
        executor
            .execute(create_cmd(Actor::User("u-user".into()), "فصل أسطوري", None))
            .await
            .unwrap(),
    );

    executor
        .execute(AppCommand::SetReaction {
            comment_id: comment.id.clone(),
            actor: Actor::User("u-elite".into()),
            kind: Some(ReactionKind::Like),
        })
        .await
        .unwrap();
    let reply = executor
        .execute(AppCommand::SetReaction {
            comment_id: comment.id.clone(),
            actor: Actor::User("u-elite".into()),
            kind: Some(ReactionKind::Love),
        })
        .await
        .unwrap();

    let tally = match reply {
        EngineReply::Tally(t) => t,
        other => panic!("expected tally, got {other:?}"),
    };
    assert_eq!(tally.count(ReactionKind::Love), 1);
    assert_eq!(tally.count(ReactionKind::Like), 0);
    assert_eq!(tally.total(), 1);
    assert_eq!(
        db.user_reaction(&comment.id, "u-elite").await.unwrap(),
        Some(ReactionKind::Love)
    );
}

#[tokio::test]
async fn anonymous_sessions_cannot_react() {
    let (executor, _db) = setup().await;

    let comment = as_comment(
        executor
            .execute(create_cmd(Actor::User("u-user".into()), "تعليق للتفاعل", None))
            .await
            .unwrap(),
    );

    let result = executor
        .execute(AppCommand::SetReaction {
            comment_id: comment.id,
            actor: Actor::Session("anon-abc".into()),
            kind: Some(ReactionKind::Like),
        })
        .await;
    assert!(matches!(result, Err(EngineError::PermissionDenied(_))));
}

#[tokio::test]
async fn replying_to_a_reply_attaches_to_the_top_level_ancestor() {
    let (executor, _db) = setup().await;

    let top = as_comment(
        executor
            .execute(create_cmd(Actor::User("u-user".into()), "تعليق رئيسي", None))
            .await
            .unwrap(),
    );
    let reply = as_comment(
        executor
            .execute(create_cmd(
                Actor::User("u-elite".into()),
                "رد أول",
                Some(top.id.clone()),
            ))
            .await
            .unwrap(),
    );
    let nested = as_comment(
        executor
            .execute(create_cmd(
                Actor::User("u-tribe".into()),
                "رد على الرد",
                Some(reply.id.clone()),
            ))
            .await
            .unwrap(),
    );

    assert_eq!(nested.parent_id(), Some(top.id.as_str()));
}

#[tokio::test]
async fn pinned_comment_leads_the_listing() {
    let (executor, db) = setup().await;

    let _first = as_comment(
        executor
            .execute(create_cmd(Actor::User("u-user".into()), "الأول زمنيا", None))
            .await
            .unwrap(),
    );
    let second = as_comment(
        executor
            .execute(create_cmd(Actor::User("u-user".into()), "الثاني زمنيا", None))
            .await
            .unwrap(),
    );

    // Elite fighters cannot pin; tribe leaders can.
    let denied = executor
        .execute(AppCommand::SetPinned {
            comment_id: second.id.clone(),
            actor: Actor::User("u-elite".into()),
            pinned: true,
        })
        .await;
    assert!(matches!(denied, Err(EngineError::PermissionDenied(_))));

    executor
        .execute(AppCommand::SetPinned {
            comment_id: second.id.clone(),
            actor: Actor::User("u-tribe".into()),
            pinned: true,
        })
        .await
        .unwrap();

    let threads = thread::build_threads(db.list_active_comments(CHAPTER).await.unwrap());
    assert_eq!(threads[0].comment.id, second.id);
}

#[tokio::test]
async fn pin_toggle_broadcasts_a_pin_event_not_a_new_comment() {
    let db = Db::new("sqlite::memory:").await.expect("in-memory db");
    db.ensure_chapter(CHAPTER, "solo-leveling", "الفصل 110")
        .await
        .unwrap();
    db.upsert_profile("u-user", "قارئ", Role::User).await.unwrap();
    db.upsert_profile("u-tribe", "زعيم", Role::TribeLeader)
        .await
        .unwrap();
    let (tx, mut rx) = broadcast::channel(16);
    let executor = Executor::new(db.clone(), ContentModerator::with_defaults(), tx);

    let comment = as_comment(
        executor
            .execute(create_cmd(Actor::User("u-user".into()), "تعليق للتثبيت", None))
            .await
            .unwrap(),
    );
    assert!(matches!(
        rx.recv().await.unwrap(),
        IngestEvent::CommentSaved { .. }
    ));

    executor
        .execute(AppCommand::SetPinned {
            comment_id: comment.id.clone(),
            actor: Actor::User("u-tribe".into()),
            pinned: true,
        })
        .await
        .unwrap();

    match rx.recv().await.unwrap() {
        IngestEvent::CommentPinned { comment: pinned, .. } => {
            assert_eq!(pinned.id, comment.id);
            assert!(pinned.is_pinned());
            // Pinning is not an edit.
            assert!(!pinned.was_edited());
        }
        other => panic!("expected pin event, got {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_submission_is_rejected_as_spam() {
    let (executor, _db) = setup().await;
    let body = "فصل رائع جدا أنصح الجميع بقراءته";

    executor
        .execute(create_cmd(Actor::User("u-user".into()), body, None))
        .await
        .unwrap();
    let result = executor
        .execute(create_cmd(Actor::User("u-user".into()), body, None))
        .await;
    assert!(matches!(result, Err(EngineError::Validation(_))));
}

#[tokio::test]
async fn only_site_admin_assigns_roles() {
    let (executor, db) = setup().await;

    let denied = executor
        .execute(AppCommand::AssignRole {
            actor: Actor::User("u-admin".into()),
            target_user: "u-user".into(),
            role: Role::EliteFighter,
        })
        .await;
    assert!(matches!(denied, Err(EngineError::PermissionDenied(_))));

    executor
        .execute(AppCommand::AssignRole {
            actor: Actor::User("u-site".into()),
            target_user: "u-user".into(),
            role: Role::EliteFighter,
        })
        .await
        .unwrap();

    let profile = db.get_profile("u-user").await.unwrap().unwrap();
    assert_eq!(profile.role, Role::EliteFighter);
}

#[tokio::test]
async fn guest_sessions_comment_with_the_lowest_role() {
    let (executor, _db) = setup().await;

    let comment = as_comment(
        executor
            .execute(create_cmd(
                Actor::Session("anon-1234".into()),
                "تعليق زائر",
                None,
            ))
            .await
            .unwrap(),
    );
    assert_eq!(comment.author_role, Role::User);
    assert_eq!(comment.author_name, "زائر");

    let json = serde_json::to_value(&comment).unwrap();
    assert_eq!(json["kind"], "top_level");
    assert_eq!(json["is_pinned"], false);
}
