mod common;

use common::*;
use reqwest::StatusCode;

async fn create_recipe_rest(
    addr: std::net::SocketAddr,
    token: &str,
    title: &str,
) -> serde_json::Value {
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/recipes"))
        .bearer_auth(token)
        .json(&serde_json::json!({ "title": title }))
        .send()
        .await
        .expect("create recipe");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("recipe json")
}

async fn create_comment_rest(
    addr: std::net::SocketAddr,
    token: &str,
    recipe_id: &str,
    body: &str,
) -> serde_json::Value {
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/recipes/{recipe_id}/comments"))
        .bearer_auth(token)
        .json(&serde_json::json!({ "body": body }))
        .send()
        .await
        .expect("create comment");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("comment json")
}

// ---------------------------------------------------------------------------
// CRUD happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn comments_round_trip_oldest_first() {
    let (addr, _state) = start_server().await;
    let token = mint_token("usr_alice");

    let recipe = create_recipe_rest(addr, &token, "Focaccia").await;
    let recipe_id = recipe["id"].as_str().unwrap();
    assert!(recipe_id.starts_with("rcp_"));
    assert_eq!(recipe["ownerId"], "usr_alice");

    let first = create_comment_rest(addr, &token, recipe_id, "Needs more salt").await;
    assert!(first["id"].as_str().unwrap().starts_with("cmt_"));
    assert_eq!(first["authorId"], "usr_alice");
    assert_eq!(first["createdAt"], first["updatedAt"]);

    create_comment_rest(addr, &mint_token("usr_bob"), recipe_id, "Disagree").await;

    // Listing is public, no credential needed.
    let listed: serde_json::Value = reqwest::Client::new()
        .get(format!("http://{addr}/api/recipes/{recipe_id}/comments"))
        .send()
        .await
        .expect("list")
        .json()
        .await
        .expect("list json");
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["body"], "Needs more salt");
    assert_eq!(listed[1]["body"], "Disagree");
}

#[tokio::test]
async fn author_can_edit_and_delete() {
    let (addr, _state) = start_server().await;
    let token = mint_token("usr_alice");

    let recipe = create_recipe_rest(addr, &token, "Borscht").await;
    let recipe_id = recipe["id"].as_str().unwrap();
    let comment = create_comment_rest(addr, &token, recipe_id, "draft").await;
    let comment_id = comment["id"].as_str().unwrap();

    let resp = reqwest::Client::new()
        .patch(format!("http://{addr}/api/comments/{comment_id}"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "body": "final" }))
        .send()
        .await
        .expect("patch");
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(updated["body"], "final");
    assert_eq!(updated["createdAt"], comment["createdAt"]);

    let resp = reqwest::Client::new()
        .delete(format!("http://{addr}/api/comments/{comment_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // Deleting again is a 404; the record is gone.
    let resp = reqwest::Client::new()
        .delete(format!("http://{addr}/api/comments/{comment_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete again");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Authorization and validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn mutations_require_a_bearer_token() {
    let (addr, state) = start_server().await;
    let recipe = seed_recipe(&state, "usr_owner", "Congee").await;

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/recipes/{}/comments", recipe.id))
        .json(&serde_json::json!({ "body": "anon" }))
        .send()
        .await
        .expect("post");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    // Auth failures wear the standard error envelope.
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "Missing Authorization header");

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/recipes/{}/comments", recipe.id))
        .bearer_auth(mint_expired_token("usr_alice"))
        .json(&serde_json::json!({ "body": "late" }))
        .send()
        .await
        .expect("post expired");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    assert!(state.comments.list_by_recipe(&recipe.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn only_the_author_may_mutate() {
    let (addr, state) = start_server().await;
    let alice = mint_token("usr_alice");
    let bob = mint_token("usr_bob");

    let recipe = create_recipe_rest(addr, &alice, "Pierogi").await;
    let recipe_id = recipe["id"].as_str().unwrap();
    let comment = create_comment_rest(addr, &alice, recipe_id, "mine").await;
    let comment_id = comment["id"].as_str().unwrap();

    let resp = reqwest::Client::new()
        .patch(format!("http://{addr}/api/comments/{comment_id}"))
        .bearer_auth(&bob)
        .json(&serde_json::json!({ "body": "stolen" }))
        .send()
        .await
        .expect("patch");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = reqwest::Client::new()
        .delete(format!("http://{addr}/api/comments/{comment_id}"))
        .bearer_auth(&bob)
        .send()
        .await
        .expect("delete");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // A failed authorization has no observable side effect.
    let stored = state.comments.list_by_recipe(recipe_id).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].body, "mine");
}

#[tokio::test]
async fn blank_bodies_and_unknown_recipes_are_rejected() {
    let (addr, _state) = start_server().await;
    let token = mint_token("usr_alice");

    let recipe = create_recipe_rest(addr, &token, "Dal").await;
    let recipe_id = recipe["id"].as_str().unwrap();

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/recipes/{recipe_id}/comments"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "body": "   " }))
        .send()
        .await
        .expect("post blank");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/recipes/rcp_missing/comments"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "body": "hello" }))
        .send()
        .await
        .expect("post to missing recipe");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = reqwest::Client::new()
        .get(format!("http://{addr}/api/recipes/rcp_missing/comments"))
        .send()
        .await
        .expect("list missing recipe");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// REST mutations reach realtime subscribers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rest_mutations_broadcast_to_room_members() {
    let (addr, state) = start_server().await;
    let token = mint_token("usr_alice");

    let recipe = create_recipe_rest(addr, &token, "Laksa").await;
    let recipe_id = recipe["id"].as_str().unwrap().to_string();

    let mut viewer = connect_ws(addr).await;
    join_room(&mut viewer, &recipe_id).await;
    wait_until("viewer joined", || {
        state.rooms.members_of(&recipe_id).len() == 1
    })
    .await;

    let comment = create_comment_rest(addr, &token, &recipe_id, "via REST").await;
    let comment_id = comment["id"].as_str().unwrap();

    let msg = recv_json(&mut viewer).await;
    assert_eq!(msg["type"], "created");
    assert_eq!(msg["seq"], 1);
    assert_eq!(msg["comment"]["id"], *comment_id);

    let resp = reqwest::Client::new()
        .patch(format!("http://{addr}/api/comments/{comment_id}"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "body": "edited over REST" }))
        .send()
        .await
        .expect("patch");
    assert_eq!(resp.status(), StatusCode::OK);

    let msg = recv_json(&mut viewer).await;
    assert_eq!(msg["type"], "updated");
    assert_eq!(msg["seq"], 2);
    assert_eq!(msg["comment"]["body"], "edited over REST");

    let resp = reqwest::Client::new()
        .delete(format!("http://{addr}/api/comments/{comment_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .expect("delete");
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let msg = recv_json(&mut viewer).await;
    assert_eq!(msg["type"], "deleted");
    assert_eq!(msg["seq"], 3);
    assert_eq!(msg["commentId"], *comment_id);
}
