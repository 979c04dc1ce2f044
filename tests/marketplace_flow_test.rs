use chrono::Utc;
use marketplace_backend::dto::application_dto::SubmitApplicationPayload;
use marketplace_backend::dto::auth_dto::SignupPayload;
use marketplace_backend::dto::job_dto::{CreateJobPayload, JobListQuery};
use marketplace_backend::middleware::auth::RequestContext;
use marketplace_backend::models::application::ApplicationStatus;
use marketplace_backend::models::job::JobCategory;
use marketplace_backend::models::user::{Role, User};
use marketplace_backend::AppState;
use uuid::Uuid;

fn ctx_for(user: &User) -> RequestContext {
    RequestContext {
        user_id: user.id,
        role: user.role,
        is_verified: user.is_verified,
        is_business_verified: user.is_business_verified,
    }
}

fn signup(run: &str, label: &str, role: Role) -> SignupPayload {
    SignupPayload {
        name: format!("{} {}", label, run),
        email: format!("{}_{}@example.com", label, run),
        password: "correct-horse-battery".into(),
        role,
    }
}

fn job_payload(title: &str) -> CreateJobPayload {
    CreateJobPayload {
        title: title.into(),
        company: Some("Example BV".into()),
        location: Some("Utrecht".into()),
        category: JobCategory::Techniek,
        employment_type: Some("fulltime".into()),
        salary_from: None,
        salary_to: None,
        description: "Build and maintain things.".into(),
        requirements: None,
        is_visible: Some(true),
    }
}

/// End-to-end lifecycle against a real database. Skipped when DATABASE_URL is
/// not configured so the suite stays runnable without infrastructure.
#[tokio::test]
async fn marketplace_end_to_end() {
    dotenvy::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("skipping marketplace_end_to_end: DATABASE_URL not set");
        return;
    }
    std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    std::env::set_var("JWT_SECRET", "test_secret_key");
    std::env::set_var("JWT_TTL_HOURS", "24");
    std::env::set_var("MAIL_API_URL", "http://localhost:9/send");
    std::env::set_var("MAIL_API_KEY", "mk-test");
    std::env::set_var("MAIL_FROM", "noreply@example.com");
    std::env::set_var("ADMIN_EMAIL", "admin@example.com");
    std::env::set_var("AUTH_RPS", "100");
    let _ = marketplace_backend::config::init_config();

    let pool = marketplace_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");

    let state = AppState::new(pool.clone());
    let run = Uuid::new_v4().simple().to_string();

    // signup + email uniqueness
    let student = state
        .user_service
        .register(signup(&run, "student", Role::Student))
        .await
        .expect("student signup");
    let duplicate = state
        .user_service
        .register(signup(&run, "student", Role::Expert))
        .await;
    assert!(duplicate.is_err(), "duplicate email must be rejected");

    // ambassador verification workflow
    let ambassador = state
        .user_service
        .register(signup(&run, "ambassador", Role::Ambassador))
        .await
        .expect("ambassador signup");
    assert!(!ambassador.is_verified);

    // unverified ambassadors may not post
    let premature = state
        .job_service
        .create(&ctx_for(&ambassador), job_payload("Too early"))
        .await;
    assert!(premature.is_err(), "unverified ambassador must not post");

    let ambassador = state
        .verification_service
        .issue_ambassador_code(ambassador.id)
        .await
        .expect("issue code");
    let code = ambassador.verification_code.clone().expect("pending code");
    assert_eq!(code.len(), 6);
    let expires = ambassador.verification_code_expires.expect("expiry");
    let hours_left = (expires - Utc::now()).num_hours();
    assert!((23..=24).contains(&hours_left), "expiry should be ~24h out");

    let wrong_code = if code == "000000" { "111111" } else { "000000" };
    let rejected = state
        .verification_service
        .confirm_code(&ambassador.email, wrong_code)
        .await;
    assert!(rejected.is_err(), "wrong code must be rejected");

    let ambassador = state
        .verification_service
        .confirm_code(&ambassador.email, &code)
        .await
        .expect("confirm code");
    assert!(ambassador.is_verified);
    assert!(ambassador.verification_code.is_none());

    // code is single-use
    let replay = state
        .verification_service
        .confirm_code(&ambassador.email, &code)
        .await;
    assert!(replay.is_err(), "used code must be rejected");

    // verified ambassador can post
    let job = state
        .job_service
        .create(&ctx_for(&ambassador), job_payload(&format!("Backend {}", run)))
        .await
        .expect("create job");

    let listed = state
        .job_service
        .list_public(JobListQuery {
            search: Some(run.clone()),
            ..Default::default()
        })
        .await
        .expect("list jobs");
    assert!(listed.items.iter().any(|j| j.id == job.id));

    // application lifecycle
    let submit = SubmitApplicationPayload {
        user_id: student.id,
        job_id: Some(job.id),
        opleiding_id: None,
        cover_letter: "I would like to apply.".into(),
        cv_url: None,
    };
    let application = state
        .application_service
        .submit(&ctx_for(&student), submit.clone())
        .await
        .expect("submit application");
    assert_eq!(application.status, ApplicationStatus::Submitted);

    let duplicate = state
        .application_service
        .submit(&ctx_for(&student), submit)
        .await;
    assert!(duplicate.is_err(), "second application must be rejected");

    // applicants may not move their own application
    let forbidden = state
        .application_service
        .update_status(&ctx_for(&student), application.id, ApplicationStatus::Accepted)
        .await;
    assert!(forbidden.is_err());

    let application = state
        .application_service
        .update_status(
            &ctx_for(&ambassador),
            application.id,
            ApplicationStatus::Rejected,
        )
        .await
        .expect("update status");
    assert_eq!(application.status, ApplicationStatus::Rejected);

    let for_posting = state
        .application_service
        .list_for_job(&ctx_for(&ambassador), job.id)
        .await
        .expect("list applications");
    assert_eq!(for_posting.len(), 1);
    assert_eq!(for_posting[0].applicant_email, student.email);

    // the rejection template landed in the outbox exactly once
    let rejection_mails: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM email_outbox WHERE recipient = $1 AND body LIKE '%not proceeding%'",
    )
    .bind(&student.email)
    .fetch_one(&pool)
    .await
    .expect("count mails");
    assert_eq!(rejection_mails, 1);

    // STUDENT -> AMBASSADOR role transition
    let applicant = state
        .user_service
        .register(signup(&run, "aspiring", Role::Student))
        .await
        .expect("student signup");
    let applicant = state
        .user_service
        .apply_ambassador(applicant.id)
        .await
        .expect("ambassador application");
    assert_eq!(applicant.role, Role::Ambassador);
    assert!(!applicant.is_verified);

    let expert = state
        .user_service
        .register(signup(&run, "expert", Role::Expert))
        .await
        .expect("expert signup");
    let not_allowed = state.user_service.apply_ambassador(expert.id).await;
    assert!(not_allowed.is_err(), "only students may apply");

    // business verification gate
    let business = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (name, email, password_hash, role)
        VALUES ($1, $2, 'x', 'BUSINESS')
        RETURNING *
        "#,
    )
    .bind(format!("Business {}", run))
    .bind(format!("business_{}@example.com", run))
    .fetch_one(&pool)
    .await
    .expect("seed business");

    let blocked = state
        .job_service
        .create(&ctx_for(&business), job_payload("Blocked"))
        .await;
    assert!(blocked.is_err(), "unapproved business must not post");

    state
        .verification_service
        .set_business_verified(business.id, true)
        .await
        .expect("approve business");
    // the gate re-reads the user row, so the stale context may stay as-is
    state
        .job_service
        .create(&ctx_for(&business), job_payload(&format!("Sales {}", run)))
        .await
        .expect("approved business can post");

    state
        .verification_service
        .set_business_verified(business.id, false)
        .await
        .expect("revoke business");
    let revoked = state
        .job_service
        .create(&ctx_for(&business), job_payload("After revoke"))
        .await;
    assert!(revoked.is_err(), "revoked business must not post");
}
