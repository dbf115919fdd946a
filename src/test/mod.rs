//! In-memory repositories and fixtures shared by the unit and HTTP tests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    api::error,
    constants::JwtConfig,
    modules::{
        assignment::repository::{AssignmentRepository, AssignmentSnapshot},
        media::{model::NewMedia, repository::MediaRepository, schema::MediaEntity},
        user::{
            model::InsertUser,
            repository::UserRepository,
            schema::{UserEntity, UserRole},
        },
    },
};

pub fn jwt_config() -> JwtConfig {
    JwtConfig { secret: "test-secret".to_string(), expiration: 3600 }
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn user_entity(email: &str, created_offset_secs: i64) -> UserEntity {
    let created_at = base_time() + Duration::seconds(created_offset_secs);
    UserEntity {
        id: Uuid::now_v7(),
        name: email.split('@').next().unwrap_or(email).to_string(),
        email: email.to_string(),
        hash_password: "unused".to_string(),
        role: UserRole::Annotator,
        created_at,
        updated_at: created_at,
    }
}

pub fn media_entity(name: &str, uploader: Uuid, created_offset_secs: i64) -> MediaEntity {
    let created_at = base_time() + Duration::seconds(created_offset_secs);
    let stored_name = format!("{}-0-{}", created_at.timestamp_millis(), name);
    MediaEntity {
        id: Uuid::now_v7(),
        original_name: name.to_string(),
        path: format!("uploads/{stored_name}"),
        stored_name,
        mime_type: "image/png".to_string(),
        size: 1,
        uploader,
        created_at,
        updated_at: created_at,
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<Vec<UserEntity>>,
    media: Mutex<Vec<MediaEntity>>,
    fail_media_inserts: AtomicBool,
}

impl InMemoryStore {
    pub fn push_user(&self, user: UserEntity) -> Uuid {
        let id = user.id;
        self.users.lock().unwrap().push(user);
        id
    }

    pub fn push_media(&self, item: MediaEntity) {
        self.media.lock().unwrap().push(item);
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn media_count(&self) -> usize {
        self.media.lock().unwrap().len()
    }

    pub fn fail_media_inserts(&self) {
        self.fail_media_inserts.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self.users.lock().unwrap().iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, error::SystemError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create(&self, user: &InsertUser) -> Result<UserEntity, error::SystemError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email.eq_ignore_ascii_case(&user.email)) {
            return Err(error::SystemError::Conflict(None));
        }

        let now = Utc::now();
        let entity = UserEntity {
            id: Uuid::now_v7(),
            name: user.name.clone(),
            email: user.email.clone(),
            hash_password: user.hash_password.clone(),
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        users.push(entity.clone());
        Ok(entity)
    }
}

#[async_trait::async_trait]
impl MediaRepository for InMemoryStore {
    async fn insert_many(&self, items: &[NewMedia]) -> Result<Vec<MediaEntity>, error::SystemError> {
        if self.fail_media_inserts.load(Ordering::SeqCst) {
            return Err(error::SystemError::DatabaseError("insert rejected".into()));
        }

        let now = Utc::now();
        let saved: Vec<MediaEntity> = items
            .iter()
            .map(|item| MediaEntity {
                id: Uuid::now_v7(),
                original_name: item.original_name.clone(),
                stored_name: item.stored_name.clone(),
                mime_type: item.mime_type.clone(),
                size: item.size,
                path: item.path.clone(),
                uploader: item.uploader,
                created_at: now,
                updated_at: now,
            })
            .collect();

        self.media.lock().unwrap().extend(saved.iter().cloned());
        Ok(saved)
    }

    async fn find_newest_first(&self) -> Result<Vec<MediaEntity>, error::SystemError> {
        let mut items = self.media.lock().unwrap().clone();
        items.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(items)
    }

    async fn find_by_stored_name(
        &self,
        stored_name: &str,
    ) -> Result<Option<MediaEntity>, error::SystemError> {
        Ok(self.media.lock().unwrap().iter().find(|m| m.stored_name == stored_name).cloned())
    }
}

#[async_trait::async_trait]
impl AssignmentRepository for InMemoryStore {
    async fn load_snapshot(&self) -> Result<AssignmentSnapshot, error::SystemError> {
        let mut media = self.media.lock().unwrap().clone();
        media.sort_by_key(|m| (m.created_at, m.id));
        let mut users = self.users.lock().unwrap().clone();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(AssignmentSnapshot { media, users })
    }
}

mod http {
    use std::sync::Arc;

    use actix_web::{dev::ServiceResponse, http::StatusCode, test, web, App};

    use super::*;
    use crate::{
        api::success::SuccessData,
        modules::{
            assignment::service::AssignmentService,
            media::{model::UploadConfig, schema::MediaListResponse, service::MediaService},
            user::{
                model::{AuthResponse, MeResponse},
                service::UserService,
            },
        },
    };

    const BOUNDARY: &str = "annotator-test-boundary";

    macro_rules! test_app {
        ($store:expr, $dir:expr, $block_size:expr) => {
            test_app!($store, $dir, $block_size, crate::constants::DEFAULT_MAX_FILES_PER_UPLOAD)
        };
        ($store:expr, $dir:expr, $block_size:expr, $max_files:expr) => {{
            let store: Arc<InMemoryStore> = $store;
            let user_service = UserService::with_dependencies(store.clone(), None, jwt_config());
            let media_service = MediaService::new(
                store.clone(),
                UploadConfig {
                    upload_dir: $dir.path().to_string_lossy().into_owned(),
                    max_files: $max_files,
                    ..UploadConfig::default()
                },
            );
            let assignment_service = AssignmentService::new(store, $block_size);

            test::init_service(
                App::new()
                    .app_data(web::Data::new(user_service))
                    .app_data(web::Data::new(media_service))
                    .app_data(web::Data::new(assignment_service))
                    .configure(crate::routes::<InMemoryStore, InMemoryStore>),
            )
            .await
        }};
    }

    fn status_of(result: Result<ServiceResponse, actix_web::Error>) -> StatusCode {
        match result {
            Ok(res) => res.status(),
            Err(e) => e.as_response_error().status_code(),
        }
    }

    fn multipart(files: &[(&str, Option<&str>, &str)]) -> String {
        let mut body = String::new();
        for (filename, content_type, content) in files {
            body.push_str(&format!("--{BOUNDARY}\r\n"));
            body.push_str(&format!(
                "Content-Disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\n"
            ));
            if let Some(content_type) = content_type {
                body.push_str(&format!("Content-Type: {content_type}\r\n"));
            }
            body.push_str(&format!("\r\n{content}\r\n"));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn register_request(name: &str, email: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(serde_json::json!({ "name": name, "email": email, "password": "secret1" }))
    }

    async fn auth_from(res: ServiceResponse) -> AuthResponse {
        assert!(res.status().is_success(), "unexpected status {}", res.status());
        let body: SuccessData<AuthResponse> = test::read_body_json(res).await;
        body.data.unwrap()
    }

    fn bearer(token: &str) -> (&'static str, String) {
        ("Authorization", format!("Bearer {token}"))
    }

    fn names(body: SuccessData<MediaListResponse>) -> Vec<String> {
        body.data.unwrap().items.into_iter().map(|m| m.original_name).collect()
    }

    #[actix_web::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app!(Arc::new(InMemoryStore::default()), dir, 200);

        let req = test::TestRequest::get().uri("/health").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["status"], "ok");
    }

    #[actix_web::test]
    async fn test_register_login_and_me() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryStore::default());
        let app = test_app!(store.clone(), dir, 200);

        let req = register_request("Ann", "Ann@Example.com").to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let registered = auth_from(res).await;
        assert_eq!(registered.user.email, "ann@example.com");
        assert_eq!(store.user_count(), 1);

        let req = register_request("Ann", "ann@example.com").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({ "email": "ann@example.com", "password": "wrong-pass" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(serde_json::json!({ "email": "ann@example.com", "password": "secret1" }))
            .to_request();
        let token = auth_from(test::call_service(&app, req).await).await.token;

        let req =
            test::TestRequest::get().uri("/api/auth/me").insert_header(bearer(&token)).to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        let me: SuccessData<MeResponse> = test::read_body_json(res).await;
        assert_eq!(me.data.unwrap().user.id, registered.user.id);
    }

    #[actix_web::test]
    async fn test_register_validates_body() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app!(Arc::new(InMemoryStore::default()), dir, 200);

        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(serde_json::json!({ "name": " ", "email": "nope", "password": "1" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_protected_routes_require_token() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app!(Arc::new(InMemoryStore::default()), dir, 200);

        for uri in ["/api/auth/me", "/api/media", "/api/media/assignments"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let status = status_of(test::try_call_service(&app, req).await);
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} without token");

            let req =
                test::TestRequest::get().uri(uri).insert_header(bearer("garbage")).to_request();
            let status = status_of(test::try_call_service(&app, req).await);
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri} with garbage token");
        }
    }

    #[actix_web::test]
    async fn test_upload_list_serve_and_assign() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app!(Arc::new(InMemoryStore::default()), dir, 2);

        let req = register_request("Alice", "alice@example.com").to_request();
        let alice = auth_from(test::call_service(&app, req).await).await;
        let req = register_request("Bob", "bob@example.com").to_request();
        let bob = auth_from(test::call_service(&app, req).await).await;

        let body = multipart(&[
            ("one.png", Some("image/png"), "first"),
            ("two.txt", Some("text/plain"), "second"),
            ("three notes.txt", None, "third"),
        ]);
        let req = test::TestRequest::post()
            .uri("/api/media/upload")
            .insert_header(bearer(&alice.token))
            .insert_header(("Content-Type", format!("multipart/form-data; boundary={BOUNDARY}")))
            .set_payload(body)
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let uploaded: SuccessData<MediaListResponse> = test::read_body_json(res).await;
        let uploaded = uploaded.data.unwrap().items;
        assert_eq!(uploaded.len(), 3);
        assert_eq!(uploaded[0].mime_type, "image/png");
        assert_eq!(uploaded[0].uploader, alice.user.id);
        assert!(uploaded[2].stored_name.ends_with("-three_notes.txt"));
        assert!(uploaded[0].url.ends_with(&uploaded[0].path));

        let req = test::TestRequest::get()
            .uri("/api/media")
            .insert_header(bearer(&bob.token))
            .to_request();
        let listed = names(test::call_and_read_body_json(&app, req).await);
        assert_eq!(listed, ["three notes.txt", "two.txt", "one.png"]);

        let req = test::TestRequest::get()
            .uri(&format!("/{}", uploaded[0].path))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers().get("content-type").unwrap(), "image/png");
        assert_eq!(test::read_body(res).await, "first");

        let req = test::TestRequest::get()
            .uri("/api/media/assignments")
            .insert_header(bearer(&alice.token))
            .to_request();
        let mine = names(test::call_and_read_body_json(&app, req).await);
        assert_eq!(mine, ["one.png", "two.txt"]);

        let req = test::TestRequest::get()
            .uri("/api/media/assignments")
            .insert_header(bearer(&bob.token))
            .to_request();
        let theirs = names(test::call_and_read_body_json(&app, req).await);
        assert_eq!(theirs, ["three notes.txt"]);
    }

    #[actix_web::test]
    async fn test_upload_without_files_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app!(Arc::new(InMemoryStore::default()), dir, 200);
        let req = register_request("Alice", "alice@example.com").to_request();
        let alice = auth_from(test::call_service(&app, req).await).await;

        let req = test::TestRequest::post()
            .uri("/api/media/upload")
            .insert_header(bearer(&alice.token))
            .insert_header(("Content-Type", format!("multipart/form-data; boundary={BOUNDARY}")))
            .set_payload(format!("--{BOUNDARY}--\r\n"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_upload_over_file_limit_is_rejected_and_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(InMemoryStore::default());
        let app = test_app!(store.clone(), dir, 200, 2);
        let req = register_request("Alice", "alice@example.com").to_request();
        let alice = auth_from(test::call_service(&app, req).await).await;

        let body = multipart(&[
            ("a.txt", Some("text/plain"), "a"),
            ("b.txt", Some("text/plain"), "b"),
            ("c.txt", Some("text/plain"), "c"),
        ]);
        let req = test::TestRequest::post()
            .uri("/api/media/upload")
            .insert_header(bearer(&alice.token))
            .insert_header(("Content-Type", format!("multipart/form-data; boundary={BOUNDARY}")))
            .set_payload(body)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(store.media_count(), 0);
    }

    #[actix_web::test]
    async fn test_user_role_is_sent_uppercase() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app!(Arc::new(InMemoryStore::default()), dir, 200);

        let req = register_request("Ann", "ann@example.com").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["user"]["role"], "ANNOTATOR");
    }

    #[actix_web::test]
    async fn test_serve_unknown_upload_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app!(Arc::new(InMemoryStore::default()), dir, 200);

        let req = test::TestRequest::get().uri("/uploads/1-2-missing.png").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
