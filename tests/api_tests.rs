mod common;

use common::TestApp;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn body(response: reqwest::Response) -> Value {
    response.json().await.expect("Failed to parse response")
}

#[tokio::test]
async fn test_register_login_and_list_empty_tasks() {
    let app = TestApp::spawn().await;
    app.register("alice", "alice@x.com", "secret1").await;

    let response = app
        .post("/api/auth/login")
        .json(&json!({"email": "alice@x.com", "password": "secret1"}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let login = body(response).await;
    assert_eq!(login["success"], true);
    assert_eq!(login["data"]["user"]["username"], "alice");
    assert!(login["data"]["user"].get("passwordHash").is_none());
    let token = login["data"]["token"].as_str().unwrap().to_string();

    let response = app
        .get("/api/tasks")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let tasks = body(response).await;
    assert_eq!(tasks["success"], true);
    assert_eq!(tasks["data"], json!([]));
    assert_eq!(tasks["count"], 0);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_look_the_same() {
    let app = TestApp::spawn().await;
    app.register("alice", "alice@x.com", "secret1").await;

    let wrong = app
        .post("/api/auth/login")
        .json(&json!({"email": "alice@x.com", "password": "secret2"}))
        .send()
        .await
        .expect("Failed to execute request");
    let unknown = app
        .post("/api/auth/login")
        .json(&json!({"email": "nobody@x.com", "password": "secret1"}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let wrong = body(wrong).await;
    assert_eq!(wrong, json!({"success": false, "error": "Invalid credentials"}));
    assert_eq!(body(unknown).await, wrong);
}

#[tokio::test]
async fn test_protected_route_without_header() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/tasks")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body(response).await,
        json!({"success": false, "error": "Authentication required. Please login."})
    );
}

#[tokio::test]
async fn test_malformed_and_garbage_tokens_get_the_same_401() {
    let app = TestApp::spawn().await;

    for header in ["Token abc", "Bearer ", "Bearer not.a.jwt", "bearer abc"] {
        let response = app
            .get("/api/notes")
            .header("Authorization", header)
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{header}");
        assert_eq!(
            body(response).await,
            json!({"success": false, "error": "Authentication required. Please login."})
        );
    }
}

#[tokio::test]
async fn test_other_users_note_is_not_found() {
    let app = TestApp::spawn().await;
    let (alice, _) = app.register("alice", "alice@x.com", "secret1").await;
    let (bob, _) = app.register("bob", "bob@x.com", "secret1").await;

    let created = app
        .post("/api/notes")
        .bearer_auth(&alice)
        .json(&json!({"title": "Plans", "content": "private", "tags": ["home"]}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(created.status(), StatusCode::CREATED);
    let note_id = body(created).await["data"]["id"].as_str().unwrap().to_string();

    let foreign = app
        .get(&format!("/api/notes/{}", note_id))
        .bearer_auth(&bob)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);
    let foreign = body(foreign).await;

    let missing = app
        .get(&format!("/api/notes/{}", uuid::Uuid::new_v4()))
        .bearer_auth(&bob)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(body(missing).await, foreign);

    let update = app
        .put(&format!("/api/notes/{}", note_id))
        .bearer_auth(&bob)
        .json(&json!({"content": "hijacked"}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(update.status(), StatusCode::NOT_FOUND);

    let delete = app
        .delete(&format!("/api/notes/{}", note_id))
        .bearer_auth(&bob)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(delete.status(), StatusCode::NOT_FOUND);

    let own = app
        .get(&format!("/api/notes/{}", note_id))
        .bearer_auth(&alice)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(own.status(), StatusCode::OK);
    assert_eq!(body(own).await["data"]["content"], "private");
}

#[tokio::test]
async fn test_repeat_delete_is_not_found() {
    let app = TestApp::spawn().await;
    let (token, _) = app.register("alice", "alice@x.com", "secret1").await;

    let created = app
        .post("/api/tasks")
        .bearer_auth(&token)
        .json(&json!({"title": "Ship it"}))
        .send()
        .await
        .expect("Failed to execute request");
    let id = body(created).await["data"]["id"].as_str().unwrap().to_string();

    let first = app
        .delete(&format!("/api/tasks/{}", id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body(first).await["message"], "Task deleted successfully");

    let second = app
        .delete(&format!("/api/tasks/{}", id))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body(second).await,
        json!({"success": false, "error": "Task not found"})
    );
}

#[tokio::test]
async fn test_owner_in_body_is_ignored() {
    let app = TestApp::spawn().await;
    let (alice, alice_id) = app.register("alice", "alice@x.com", "secret1").await;
    let (_, bob_id) = app.register("bob", "bob@x.com", "secret1").await;

    let created = app
        .post("/api/tasks")
        .bearer_auth(&alice)
        .json(&json!({"title": "Mine", "userId": bob_id}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(created.status(), StatusCode::CREATED);
    assert_eq!(body(created).await["data"]["userId"], alice_id);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::spawn().await;
    app.register("alice", "alice@x.com", "secret1").await;

    let response = app
        .post("/api/auth/register")
        .json(&json!({"username": "alice2", "email": "ALICE@x.com", "password": "secret1"}))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        body(response).await["error"],
        "Username or email is already registered"
    );
}

#[tokio::test]
async fn test_registration_validation() {
    let app = TestApp::spawn().await;

    let short_password = app
        .post("/api/auth/register")
        .json(&json!({"username": "alice", "email": "alice@x.com", "password": "123"}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(short_password.status(), StatusCode::BAD_REQUEST);

    let missing_field = app
        .post("/api/auth/register")
        .json(&json!({"username": "alice"}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(missing_field.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(missing_field).await["success"], false);
}

#[tokio::test]
async fn test_me_and_password_change() {
    let app = TestApp::spawn().await;
    let (token, id) = app.register("alice", "alice@x.com", "secret1").await;

    let me = app
        .get("/api/auth/me")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(me.status(), StatusCode::OK);
    assert_eq!(body(me).await["data"]["id"], id);

    let wrong = app
        .put("/api/auth/password")
        .bearer_auth(&token)
        .json(&json!({"currentPassword": "nope", "newPassword": "secret2"}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let changed = app
        .put("/api/auth/password")
        .bearer_auth(&token)
        .json(&json!({"currentPassword": "secret1", "newPassword": "secret2"}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(changed.status(), StatusCode::OK);

    let old = app
        .post("/api/auth/login")
        .json(&json!({"email": "alice@x.com", "password": "secret1"}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(old.status(), StatusCode::UNAUTHORIZED);

    let new = app
        .post("/api/auth/login")
        .json(&json!({"email": "alice@x.com", "password": "secret2"}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(new.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_goal_progress_and_completion() {
    let app = TestApp::spawn().await;
    let (token, _) = app.register("alice", "alice@x.com", "secret1").await;

    let created = app
        .post("/api/goals")
        .bearer_auth(&token)
        .json(&json!({"title": "Read 12 books", "target": 12, "category": "learning"}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(created.status(), StatusCode::CREATED);
    let goal = body(created).await;
    let id = goal["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(goal["data"]["deadline"], "No deadline");

    let progress = app
        .put(&format!("/api/goals/{}/progress", id))
        .bearer_auth(&token)
        .json(&json!({"progress": 140}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(progress.status(), StatusCode::OK);
    let progress = body(progress).await;
    assert_eq!(progress["data"]["progress"], 100);
    assert_eq!(progress["data"]["completed"], true);
    assert_eq!(progress["message"], "Progress updated to 100%");

    let reopened = app
        .put(&format!("/api/goals/{}/complete", id))
        .bearer_auth(&token)
        .json(&json!({"completed": false}))
        .send()
        .await
        .expect("Failed to execute request");
    let reopened = body(reopened).await;
    assert_eq!(reopened["data"]["progress"], 99);
    assert_eq!(reopened["data"]["completed"], false);

    let stats = app
        .get("/api/goals/stats")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    let stats = body(stats).await;
    assert_eq!(stats["data"]["total"], 1);
    assert_eq!(stats["data"]["inProgress"], 1);
    assert_eq!(stats["data"]["averageProgress"], 99);

    app.post("/api/goals")
        .bearer_auth(&token)
        .json(&json!({"title": "Run a marathon", "target": 1, "category": "health"}))
        .send()
        .await
        .expect("Failed to execute request");

    let listed = app
        .get("/api/goals?limit=1")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(listed.status(), StatusCode::OK);
    let listed = body(listed).await;
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["data"][0]["progress"], 99);
    assert_eq!(listed["stats"]["total"], 2);
    assert_eq!(listed["stats"]["inProgress"], 2);
    assert_eq!(listed["stats"]["averageProgress"], 50);

    let learning = app
        .get("/api/goals?category=learning")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    let learning = body(learning).await;
    assert_eq!(learning["count"], 1);
    assert_eq!(learning["stats"]["total"], 1);
}

#[tokio::test]
async fn test_settings_roundtrip() {
    let app = TestApp::spawn().await;
    let (token, _) = app.register("alice", "alice@x.com", "secret1").await;

    let initial = app
        .get("/api/settings")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    let initial = body(initial).await;
    assert_eq!(initial["data"]["darkMode"], true);
    assert_eq!(initial["data"]["accentColor"], "electric-red");

    let dark = app
        .put("/api/settings/dark-mode")
        .bearer_auth(&token)
        .json(&json!({"darkMode": false}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(
        body(dark).await,
        json!({"success": true, "data": {"darkMode": false}, "message": "Dark mode updated"})
    );

    let replaced = app
        .put("/api/settings")
        .bearer_auth(&token)
        .json(&json!({"settings": {"accentColor": "bright-blue", "darkMode": false}}))
        .send()
        .await
        .expect("Failed to execute request");
    let replaced = body(replaced).await;
    assert_eq!(replaced["data"]["accentColor"], "bright-blue");
    assert_eq!(replaced["data"]["notifications"]["email"], true);
    assert_eq!(replaced["message"], "Settings updated successfully");
}

#[tokio::test]
async fn test_timer_settings_merge_and_persist() {
    let app = TestApp::spawn().await;
    let (token, _) = app.register("alice", "alice@x.com", "secret1").await;

    let updated = app
        .put("/api/timer/settings")
        .bearer_auth(&token)
        .json(&json!({"focusDuration": 3000, "soundEnabled": false}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(updated.status(), StatusCode::OK);

    let read = app
        .get("/api/timer/settings")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    let read = body(read).await;
    assert_eq!(read["data"]["focusDuration"], 3000);
    assert_eq!(read["data"]["soundEnabled"], false);
    assert_eq!(read["data"]["breakDuration"], 300);

    let invalid = app
        .put("/api/timer/settings")
        .bearer_auth(&token)
        .json(&json!({"breakDuration": 0}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_timer_sessions_today_summary() {
    let app = TestApp::spawn().await;
    let (token, _) = app.register("alice", "alice@x.com", "secret1").await;

    for (kind, minutes) in [("pomodoro", 25), ("break", 5), ("deep-work", 50)] {
        let created = app
            .post("/api/timer/sessions")
            .bearer_auth(&token)
            .json(&json!({"timerType": kind, "duration": minutes}))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(created.status(), StatusCode::CREATED);
    }

    let today = app
        .get("/api/timer/sessions/today")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(today.status(), StatusCode::OK);
    let today = body(today).await;
    assert_eq!(today["count"], 3);
    assert_eq!(today["summary"]["focusSessions"], 2);
    assert_eq!(today["summary"]["totalFocusTime"], 75);
    assert_eq!(today["summary"]["totalBreakTime"], 5);
    assert_eq!(today["summary"]["streakMaintained"], true);

    let filtered = app
        .get("/api/timer/sessions?timerType=break")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(body(filtered).await["count"], 1);

    let stats = app
        .get("/api/timer/stats")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    let stats = body(stats).await;
    assert_eq!(stats["data"]["streak"], 1);
    assert_eq!(stats["data"]["weeklyGoal"]["current"], 2);
}

#[tokio::test]
async fn test_moods_today_average() {
    let app = TestApp::spawn().await;
    let (token, _) = app.register("alice", "alice@x.com", "secret1").await;

    for (mood, energy) in [("happy", 4), ("stressed", 1)] {
        app.post("/api/moods")
            .bearer_auth(&token)
            .json(&json!({"mood": mood, "energyLevel": energy}))
            .send()
            .await
            .expect("Failed to execute request");
    }

    let today = app
        .get("/api/moods/today")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    let today = body(today).await;
    assert_eq!(today["count"], 2);
    assert_eq!(today["averageEnergy"], 3);

    let bad_energy = app
        .post("/api/moods")
        .bearer_auth(&token)
        .json(&json!({"mood": "happy", "energyLevel": 9}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(bad_energy.status(), StatusCode::BAD_REQUEST);

    let last_day = app
        .get("/api/moods?date=9999-12-31")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(last_day.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body(last_day).await["success"], false);
}

#[tokio::test]
async fn test_calendar_month_filter() {
    let app = TestApp::spawn().await;
    let (token, _) = app.register("alice", "alice@x.com", "secret1").await;

    for (day, month) in [(3, 5), (20, 5), (1, 6)] {
        let created = app
            .post("/api/calendar/events")
            .bearer_auth(&token)
            .json(&json!({"title": "Event", "day": day, "month": month, "year": 2025}))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(created.status(), StatusCode::CREATED);
    }

    let may = app
        .get("/api/calendar/events?month=5&year=2025")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    let may = body(may).await;
    assert_eq!(may["count"], 2);
    assert_eq!(may["data"][0]["day"], 3);
    assert_eq!(may["data"][0]["color"], "bright-blue");

    let month_only = app
        .get("/api/calendar/events?month=5")
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(body(month_only).await["count"], 3);
}

#[tokio::test]
async fn test_chat_clear_is_per_user() {
    let app = TestApp::spawn().await;
    let (alice, _) = app.register("alice", "alice@x.com", "secret1").await;
    let (bob, _) = app.register("bob", "bob@x.com", "secret1").await;

    for (token, message) in [(&alice, "plan my week"), (&alice, "  review goals "), (&bob, "hello")] {
        let sent = app
            .post("/api/ai/chat")
            .bearer_auth(token)
            .json(&json!({"message": message}))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(sent.status(), StatusCode::OK);
        let sent = body(sent).await;
        assert_eq!(sent["data"]["userMessage"]["message"], message.trim());
        assert_eq!(sent["data"]["aiResponse"]["sender"], "ai");
    }

    let blank = app
        .post("/api/ai/chat")
        .bearer_auth(&alice)
        .json(&json!({"message": "   "}))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(blank.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body(blank).await,
        json!({"success": false, "error": "Please provide a message"})
    );

    let cleared = app
        .delete("/api/ai/chat")
        .bearer_auth(&bob)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(cleared.status(), StatusCode::OK);
    let cleared = body(cleared).await;
    assert_eq!(cleared["clearedCount"], 1);
    assert_eq!(cleared["message"], "Chat history cleared successfully");

    let bob_history = app
        .get("/api/ai/chat")
        .bearer_auth(&bob)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(body(bob_history).await["count"], 0);

    let alice_history = app
        .get("/api/ai/chat")
        .bearer_auth(&alice)
        .send()
        .await
        .expect("Failed to execute request");
    let alice_history = body(alice_history).await;
    assert_eq!(alice_history["count"], 4);
    assert_eq!(alice_history["data"][0]["type"], "ai_response");
    let asked: Vec<&str> = alice_history["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["type"] == "user_message")
        .map(|m| m["message"].as_str().unwrap())
        .collect();
    assert_eq!(asked, vec!["review goals", "plan my week"]);

    let latest = app
        .get("/api/ai/chat?limit=1")
        .bearer_auth(&alice)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(body(latest).await["count"], 2);

    let unauthenticated = app
        .delete("/api/ai/chat")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/health")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let health = body(response).await;
    assert_eq!(health["status"], "OK");
    assert_eq!(health["database"], "connected");
    assert!(health["timestamp"].is_string());
}
