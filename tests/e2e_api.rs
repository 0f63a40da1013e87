/// E2E tests for the JSON API
/// These tests run against a real server instance
use reqwest::Client;
use serde_json::json;

const BASE_URL: &str = "http://localhost:3000";

/// Register a fresh account and leave its session cookie in the client's
/// cookie store.
async fn register(
    client: &Client,
    username: &str,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let email = format!("e2e-{}@example.com", uuid::Uuid::now_v7());
    let response = client
        .post(format!("{}/api/auth/register", BASE_URL))
        .json(&json!({
            "username": username,
            "email": email,
            "password": "sifre123"
        }))
        .send()
        .await?;

    assert_eq!(response.status(), 201);
    Ok(response.json().await?)
}

#[tokio::test]
#[ignore] // Run with: cargo test --test e2e_api -- --ignored
async fn test_register_login_logout_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::builder().cookie_store(true).build()?;

    let account = register(&client, "Ayşe").await?;
    assert_eq!(account["displayName"], "Ayşe");
    let email = account["email"].as_str().expect("email should be present").to_string();

    // Session cookie from registration authenticates /me
    let me = client
        .get(format!("{}/api/auth/me", BASE_URL))
        .send()
        .await?;
    assert_eq!(me.status(), 200);
    let me: serde_json::Value = me.json().await?;
    assert_eq!(me["email"], email.as_str());

    // Logout drops the session
    let logout = client
        .post(format!("{}/api/auth/logout", BASE_URL))
        .send()
        .await?;
    assert_eq!(logout.status(), 200);

    let me = client
        .get(format!("{}/api/auth/me", BASE_URL))
        .send()
        .await?;
    assert_eq!(me.status(), 401);

    // Login works with the upper-cased spelling of the same address
    let login = client
        .post(format!("{}/api/auth/login", BASE_URL))
        .json(&json!({ "email": email.to_uppercase(), "password": "sifre123" }))
        .send()
        .await?;
    assert_eq!(login.status(), 200);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_wrong_password_is_rejected_in_turkish() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::builder().cookie_store(true).build()?;

    let account = register(&client, "Mehmet").await?;
    let email = account["email"].as_str().unwrap().to_string();

    let login = client
        .post(format!("{}/api/auth/login", BASE_URL))
        .json(&json!({ "email": email, "password": "yanlis-sifre" }))
        .send()
        .await?;

    assert_eq!(login.status(), 401);
    let body = login.text().await?;
    assert!(body.contains("Hatalı şifre"));

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_entry_vote_reply_flow() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::builder().cookie_store(true).build()?;
    register(&client, "Zeynep").await?;

    // Create an entry
    let created = client
        .post(format!("{}/api/entries", BASE_URL))
        .json(&json!({
            "company": "Turkcell",
            "title": "Fatura sorunu",
            "content": "Bu ay faturam iki kez kesildi."
        }))
        .send()
        .await?;
    assert_eq!(created.status(), 201);
    let entry: serde_json::Value = created.json().await?;
    let entry_id = entry["id"].as_str().expect("Entry id should be present");
    assert_eq!(entry["author"], "Zeynep");
    assert_eq!(entry["likes"], 0);

    // Like it, then like again to take the vote back
    let voted = client
        .post(format!("{}/api/entries/{}/vote", BASE_URL, entry_id))
        .json(&json!({ "kind": "like" }))
        .send()
        .await?;
    assert_eq!(voted.status(), 200);
    let voted: serde_json::Value = voted.json().await?;
    assert_eq!(voted["entry"]["likes"], 1);
    assert_eq!(voted["myVote"], "like");

    let unvoted = client
        .post(format!("{}/api/entries/{}/vote", BASE_URL, entry_id))
        .json(&json!({ "kind": "like" }))
        .send()
        .await?;
    let unvoted: serde_json::Value = unvoted.json().await?;
    assert_eq!(unvoted["entry"]["likes"], 0);
    assert!(unvoted["myVote"].is_null());

    // Reply to the entry
    let reply = client
        .post(format!("{}/api/entries/{}/replies", BASE_URL, entry_id))
        .json(&json!({ "content": "Aynı sorunu ben de yaşadım." }))
        .send()
        .await?;
    assert_eq!(reply.status(), 201);

    let thread = client
        .get(format!("{}/api/entries/{}/replies", BASE_URL, entry_id))
        .send()
        .await?;
    let thread: serde_json::Value = thread.json().await?;
    assert_eq!(thread.as_array().unwrap().len(), 1);

    // Author can edit their own entry
    let patched = client
        .patch(format!("{}/api/entries/{}", BASE_URL, entry_id))
        .json(&json!({ "title": "Fatura sorunu (güncellendi)" }))
        .send()
        .await?;
    assert_eq!(patched.status(), 200);
    let patched: serde_json::Value = patched.json().await?;
    assert_eq!(patched["title"], "Fatura sorunu (güncellendi)");

    // Deleting the entry empties its thread
    let deleted = client
        .delete(format!("{}/api/entries/{}", BASE_URL, entry_id))
        .send()
        .await?;
    assert_eq!(deleted.status(), 200);

    let thread = client
        .get(format!("{}/api/entries/{}/replies", BASE_URL, entry_id))
        .send()
        .await?;
    let thread: serde_json::Value = thread.json().await?;
    assert_eq!(thread.as_array().unwrap().len(), 0);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_entry_validation_messages() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::builder().cookie_store(true).build()?;
    register(&client, "Ali").await?;

    let response = client
        .post(format!("{}/api/entries", BASE_URL))
        .json(&json!({ "company": "Getir", "title": "  ", "content": "İçerik" }))
        .send()
        .await?;
    assert_eq!(response.status(), 400);
    assert!(response.text().await?.contains("Başlık boş olamaz"));

    let long_content = "ş".repeat(501);
    let response = client
        .post(format!("{}/api/entries", BASE_URL))
        .json(&json!({ "company": "Getir", "title": "Başlık", "content": long_content }))
        .send()
        .await?;
    assert_eq!(response.status(), 400);
    assert!(response
        .text()
        .await?
        .contains("İçerik en fazla 500 karakter olabilir"));

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_company_pages_merge_spellings() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::builder().cookie_store(true).build()?;
    register(&client, "Fatma").await?;

    for company in ["LC Waikiki", "lcw"] {
        let response = client
            .post(format!("{}/api/entries", BASE_URL))
            .json(&json!({
                "company": company,
                "title": "Kalite sorunu",
                "content": "Aldığım ürün ilk yıkamada soldu."
            }))
            .send()
            .await?;
        assert_eq!(response.status(), 201);
    }

    // Both spellings land on the canonical company page
    let page = client
        .get(format!("{}/api/companies/lc-waikiki", BASE_URL))
        .send()
        .await?;
    assert_eq!(page.status(), 200);
    let page: serde_json::Value = page.json().await?;
    assert_eq!(page["name"], "LC Waikiki");
    assert!(page["totalComplaints"].as_i64().unwrap() >= 2);

    let feed = client
        .get(format!("{}/api/companies/lcw/entries", BASE_URL))
        .send()
        .await?;
    let feed: serde_json::Value = feed.json().await?;
    assert!(feed.as_array().unwrap().len() >= 2);

    // And the stats list shows one merged bucket
    let stats = client
        .get(format!("{}/api/companies/stats", BASE_URL))
        .send()
        .await?;
    assert_eq!(stats.status(), 200);
    let stats: serde_json::Value = stats.json().await?;
    let merged = stats
        .as_array()
        .unwrap()
        .iter()
        .find(|row| row["name"] == "LC Waikiki")
        .expect("Stats should contain the merged company");
    assert!(merged["totalComplaints"].as_i64().unwrap() >= 2);

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_admin_endpoints_reject_regular_users() -> Result<(), Box<dyn std::error::Error>> {
    let anonymous = Client::new();
    let response = anonymous
        .get(format!("{}/api/admin/stats", BASE_URL))
        .send()
        .await?;
    assert_eq!(response.status(), 401);

    let client = Client::builder().cookie_store(true).build()?;
    register(&client, "Normal Üye").await?;

    let response = client
        .get(format!("{}/api/admin/stats", BASE_URL))
        .send()
        .await?;
    assert_eq!(response.status(), 403);
    assert!(response.text().await?.contains("erişim izniniz yok"));

    Ok(())
}

#[tokio::test]
#[ignore]
async fn test_sitemap_is_served_as_xml() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new();
    let response = client.get(format!("{}/sitemap.xml", BASE_URL)).send().await?;

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("application/xml"));

    let body = response.text().await?;
    assert!(body.contains("/firma/turkcell"));

    Ok(())
}
