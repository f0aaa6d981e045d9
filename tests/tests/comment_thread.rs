use std::{panic::AssertUnwindSafe, sync::Arc};

use agora_client::{
    api::{self, Actor, Comment, CommentId, PostId, UserId, UserMetadata, Uuid},
    render, submit_reply, CommentCache, CommentNode, ReplyError, ReplyForm, ReplyTarget,
    TreeView,
};
use agora_mock_server::{MockServer, MockStore};
use parking_lot::Mutex;

const POST: PostId = PostId(1);

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed initializing tokio runtime")
        .block_on(f)
}

/// A server with one registered user, and a store logged in as that user
fn logged_in() -> (Arc<Mutex<MockServer>>, MockStore) {
    let mut server = MockServer::new();
    server
        .admin_create_user(
            UserId(Uuid::new_v4()),
            String::from("alice@example.org"),
            String::from("hunter2"),
            UserMetadata {
                full_name: Some(String::from("Alice Liddell")),
                avatar_url: Some(String::from("https://avatars.example.org/alice.png")),
                ..UserMetadata::default()
            },
        )
        .unwrap();
    let tok = server.auth("alice@example.org", "hunter2").unwrap();
    let server = Arc::new(Mutex::new(server));
    let store = MockStore::new(server.clone(), Some(tok));
    (server, store)
}

fn seed(server: &Mutex<MockServer>, rows: &[(i64, Option<i64>)]) {
    let mut server = server.lock();
    for (i, &(id, parent)) in rows.iter().enumerate() {
        server.admin_insert_comment(Comment {
            id: CommentId(id),
            post_id: POST,
            parent_comment_id: parent.map(CommentId),
            content: format!("comment {id}"),
            user_id: None,
            author: String::from("bob"),
            avatar_url: None,
            created_at: format!("2023-06-01T10:{i:02}:00Z"),
        });
    }
}

fn child_ids(nodes: &[Arc<CommentNode>]) -> Vec<i64> {
    nodes.iter().map(|n| n.id().0).collect()
}

#[test]
fn nested_thread_is_rebuilt_from_the_store() {
    block_on(async {
        let (server, store) = logged_in();
        seed(&server, &[(1, None), (2, Some(1)), (3, Some(1)), (4, Some(2))]);
        let cache = CommentCache::new(store);
        let tree = cache.tree(POST).await.unwrap();
        assert_eq!(child_ids(&tree), vec![1]);
        assert_eq!(child_ids(&tree[0].children), vec![2, 3]);
        assert_eq!(child_ids(&tree[0].children[0].children), vec![4]);
        assert!(tree[0].children[1].children.is_empty());
    })
}

#[test]
fn dangling_parent_becomes_root() {
    block_on(async {
        let (server, store) = logged_in();
        seed(&server, &[(5, Some(99))]);
        let cache = CommentCache::new(store);
        let tree = cache.tree(POST).await.unwrap();
        assert_eq!(child_ids(&tree), vec![5]);
        assert!(tree[0].children.is_empty());
    })
}

#[test]
fn blank_reply_issues_nothing() {
    block_on(async {
        let (server, store) = logged_in();
        seed(&server, &[(1, None)]);
        let cache = CommentCache::new(store);
        let mut view = TreeView::new(POST, cache.tree(POST).await.unwrap());
        view.toggle_reply(CommentId(1)).unwrap();
        view.set_draft(CommentId(1), String::from("  ")).unwrap();

        let target = view.reply_target(CommentId(1)).unwrap();
        let state = view.state_mut(CommentId(1)).unwrap();
        let res = submit_reply(state, target, &cache, cache.store()).await;
        assert_eq!(res, Err(ReplyError::Validation(api::Error::EmptyContent)));
        assert_eq!(server.lock().test_num_creates(), 0);
        assert_eq!(view.state(CommentId(1)).unwrap().form, ReplyForm::Open);
        assert_eq!(cache.generation(POST), 0);
    })
}

#[test]
fn reply_round_trip() {
    block_on(async {
        let (server, store) = logged_in();
        seed(&server, &[(1, None), (2, Some(1))]);
        let cache = CommentCache::new(store);
        let mut view = TreeView::new(POST, cache.tree(POST).await.unwrap());
        assert_eq!(server.lock().test_num_fetches(), 1);

        view.toggle_reply(CommentId(2)).unwrap();
        view.set_draft(CommentId(2), String::from("Agreed!")).unwrap();
        let target = view.reply_target(CommentId(2)).unwrap();
        let state = view.state_mut(CommentId(2)).unwrap();
        submit_reply(state, target, &cache, cache.store())
            .await
            .unwrap();

        let state = view.state(CommentId(2)).unwrap();
        assert_eq!(state.form, ReplyForm::Hidden);
        assert_eq!(state.draft, "");
        assert_eq!(cache.generation(POST), 1);

        {
            let server = server.lock();
            assert_eq!(server.test_num_creates(), 1);
            let written = server.test_comments().last().unwrap();
            assert_eq!(written.parent_comment_id, Some(CommentId(2)));
            assert_eq!(written.author, "Alice Liddell");
            assert_eq!(
                written.avatar_url.as_deref(),
                Some("https://avatars.example.org/alice.png")
            );
        }

        view.replace_tree(cache.tree(POST).await.unwrap());
        assert_eq!(server.lock().test_num_fetches(), 2);
        let rows = view.rows(&|_: &str| String::new());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].depth, 2);
        assert_eq!(rows[2].content, "Agreed!");
    })
}

#[test]
fn logged_out_cannot_reply() {
    block_on(async {
        let (server, _) = logged_in();
        seed(&server, &[(1, None)]);
        let cache = CommentCache::new(MockStore::new(server.clone(), None));
        let mut view = TreeView::new(POST, cache.tree(POST).await.unwrap());
        view.toggle_reply(CommentId(1)).unwrap();
        view.set_draft(CommentId(1), String::from("hello")).unwrap();
        let target = view.reply_target(CommentId(1)).unwrap();
        let state = view.state_mut(CommentId(1)).unwrap();
        let res = submit_reply(state, target, &cache, cache.store()).await;
        assert_eq!(res, Err(ReplyError::AuthRequired));
        assert_eq!(server.lock().test_num_creates(), 0);
    })
}

#[test]
fn rejected_reply_keeps_the_form() {
    block_on(async {
        let (server, store) = logged_in();
        seed(&server, &[(1, None)]);
        server.lock().test_reject_writes(Some(api::Error::Rejected {
            code: Some(String::from("42501")),
            message: String::from("new row violates row-level security policy"),
        }));
        let cache = CommentCache::new(store);
        let mut view = TreeView::new(POST, cache.tree(POST).await.unwrap());
        view.toggle_reply(CommentId(1)).unwrap();
        view.set_draft(CommentId(1), String::from("hello")).unwrap();
        let target = view.reply_target(CommentId(1)).unwrap();
        let state = view.state_mut(CommentId(1)).unwrap();
        let res = submit_reply(state, target, &cache, cache.store()).await;
        assert!(matches!(res, Err(ReplyError::Write(_))));
        assert_eq!(cache.generation(POST), 0);

        let rows = view.rows(&|_: &str| String::from("just now"));
        assert_eq!(
            rows[0].form.error(),
            Some("new row violates row-level security policy")
        );
        assert_eq!(rows[0].draft, "hello");
        assert_eq!(
            render::to_text(&rows),
            "#1 bob (just now)\n  comment 1\n  > hello\n  \
             Error: new row violates row-level security policy\n"
        );
    })
}

#[test]
fn composer_posts_top_level_comments() {
    block_on(async {
        let (server, store) = logged_in();
        seed(&server, &[(1, None)]);
        let cache = CommentCache::new(store);
        let mut view = TreeView::new(POST, cache.tree(POST).await.unwrap());
        let target = view.composer_target();
        view.composer_mut().set_draft(String::from("First!"));
        submit_reply(view.composer_mut(), target, &cache, cache.store())
            .await
            .unwrap();
        assert_eq!(view.composer().form, ReplyForm::Open);

        view.replace_tree(cache.tree(POST).await.unwrap());
        assert_eq!(child_ids(view.roots()), vec![1, 2]);
        assert_eq!(server.lock().test_comments()[1].parent_comment_id, None);
    })
}

#[test]
fn actor_comes_from_the_session() {
    let (_, store) = logged_in();
    let actor: Actor = agora_client::ActorProvider::current_actor(&store).unwrap();
    assert_eq!(actor.display_name, "Alice Liddell");
}

#[derive(Clone, Debug)]
enum ThreadOp {
    Comment { text: String },
    Reply { to: usize, text: String },
    Collapse { on: usize },
}

impl ThreadOp {
    fn from_input((kind, at, text): &(u8, u8, String)) -> ThreadOp {
        let text = text.chars().take(8).collect();
        match kind % 3 {
            0 => ThreadOp::Comment { text },
            1 => ThreadOp::Reply {
                to: usize::from(*at),
                text,
            },
            _ => ThreadOp::Collapse {
                on: usize::from(*at),
            },
        }
    }
}

#[test]
fn random_threads_stay_consistent() {
    let runtime = AssertUnwindSafe(
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("failed initializing tokio runtime"),
    );
    bolero::check!()
        .with_type::<Vec<(u8, u8, String)>>()
        .for_each(move |input| {
            let ops = input.iter().map(ThreadOp::from_input).collect();
            runtime.block_on(run_thread(ops))
        })
}

async fn run_thread(ops: Vec<ThreadOp>) {
    let (server, store) = logged_in();
    let cache = CommentCache::new(store);
    let mut view = TreeView::new(POST, cache.tree(POST).await.unwrap());
    let mut written = 0;
    for op in ops {
        let ids = view
            .roots()
            .iter()
            .flat_map(|r| r.depth_first())
            .map(|(n, _)| n.id())
            .collect::<Vec<_>>();
        let res = match op {
            ThreadOp::Comment { text } => {
                let target = view.composer_target();
                view.composer_mut().set_draft(text);
                submit_reply(view.composer_mut(), target, &cache, cache.store()).await
            }
            ThreadOp::Reply { to, text } => {
                let Some(&id) = ids.get(to % ids.len().max(1)) else {
                    continue;
                };
                view.toggle_reply(id).unwrap();
                view.set_draft(id, text).unwrap();
                let target: ReplyTarget = view.reply_target(id).unwrap();
                let state = view.state_mut(id).unwrap();
                submit_reply(state, target, &cache, cache.store()).await
            }
            ThreadOp::Collapse { on } => {
                if let Some(&id) = ids.get(on % ids.len().max(1)) {
                    let node_has_children = view.node(id).unwrap().has_children();
                    assert_eq!(view.toggle_collapse(id), node_has_children);
                }
                continue;
            }
        };
        match res {
            Ok(()) => written += 1,
            // blank or null-byte-laden text
            Err(ReplyError::Validation(_)) => (),
            Err(e) => panic!("got unexpected error: {e}"),
        }
        view.replace_tree(cache.tree(POST).await.unwrap());
    }

    let server = server.lock();
    assert_eq!(server.test_num_creates(), written);
    assert_eq!(cache.generation(POST), written as u64);
    let nodes = view
        .roots()
        .iter()
        .flat_map(|r| r.depth_first())
        .collect::<Vec<_>>();
    assert_eq!(nodes.len(), written);
    for root in view.roots().iter() {
        for (node, _) in root.depth_first() {
            for child in &node.children {
                assert_eq!(child.parent_comment_id, Some(node.id()));
            }
        }
    }
}
