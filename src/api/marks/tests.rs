use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::MarkType;
use crate::test_support;

const YEAR: &str = "2024/2025";
const TERM: &str = "First Term";

async fn count_rows(pool: &sqlx::PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count rows")
}

#[tokio::test]
async fn midterm_submission_clamps_and_grades() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();

    let class_id = test_support::insert_class(db, "JSS 1", "Gold").await;
    let subject_id = test_support::insert_subject(db, "Mathematics", "MTH1").await;
    let student_id = test_support::insert_student(db, "Ada", "Obi", &class_id).await;

    let payload = json!({
        "scores": [
            { "student_id": student_id, "ca1": "15", "ca2": "-3", "exam": "25" }
        ],
        "subject_id": subject_id,
        "class_id": class_id,
        "academic_year": YEAR,
        "academic_term": TERM
    });

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::admin_request(
            Method::POST,
            "/api/admin/marks/midterm",
            Some(payload),
        ))
        .await
        .expect("submit midterm");

    let status = response.status();
    let saved = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {saved}");
    assert_eq!(saved["count"], 1);
    assert_eq!(saved["message"], "Midterm scores saved successfully");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::admin_request(
            Method::GET,
            &format!("/api/admin/marks/midterm?classId={class_id}&academicYearId=2024/2025"),
            None,
        ))
        .await
        .expect("list midterm");

    assert_eq!(response.status(), StatusCode::OK);
    let rows = test_support::read_json(response).await;
    let row = &rows.as_array().expect("rows")[0];
    assert_eq!(row["ca1"], 10.0);
    assert_eq!(row["ca2"], 0.0);
    assert_eq!(row["exam"], 20.0);
    assert_eq!(row["total"], 30.0);
    assert_eq!(row["percentage"], 75);
    assert_eq!(row["grade"], "B");
    assert_eq!(row["student_name"], "Ada Obi");
    assert_eq!(row["subject_name"], "Mathematics");
}

#[tokio::test]
async fn resubmission_overwrites_instead_of_duplicating() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();

    let class_id = test_support::insert_class(db, "JSS 2", "").await;
    let subject_id = test_support::insert_subject(db, "English", "ENG2").await;
    let student_id = test_support::insert_student(db, "Bola", "Ade", &class_id).await;

    for exam_score in [12, 18] {
        let payload = json!({
            "scores": [{
                "student_id": student_id,
                "ca1_score": 5,
                "ca2_score": 5,
                "exam_score": exam_score
            }],
            "subject_id": subject_id,
            "class_id": class_id,
            "academic_year": YEAR,
            "academic_term": TERM
        });
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::admin_request(
                Method::POST,
                "/api/admin/marks/midterm",
                Some(payload),
            ))
            .await
            .expect("submit midterm");
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(count_rows(db, "midterm_scores").await, 1);
    let exam: f64 = sqlx::query_scalar("SELECT exam FROM midterm_scores")
        .fetch_one(db)
        .await
        .expect("exam score");
    assert_eq!(exam, 18.0);
}

#[tokio::test]
async fn terminal_pulls_ca_from_midterm() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();

    let class_id = test_support::insert_class(db, "SSS 1", "").await;
    let subject_id = test_support::insert_subject(db, "Physics", "PHY1").await;
    let carried = test_support::insert_student(db, "Chidi", "Eze", &class_id).await;
    let opted_out = test_support::insert_student(db, "Dayo", "Ola", &class_id).await;

    let midterm = json!({
        "scores": [
            { "student_id": carried, "ca1": 8, "ca2": 9, "exam": 15 },
            { "student_id": opted_out, "ca1": 8, "ca2": 9, "exam": 15 }
        ],
        "subject_id": subject_id,
        "class_id": class_id,
        "academic_year": YEAR,
        "academic_term": TERM
    });
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::admin_request(
            Method::POST,
            "/api/admin/marks/midterm",
            Some(midterm),
        ))
        .await
        .expect("submit midterm");
    assert_eq!(response.status(), StatusCode::OK);

    let terminal = json!({
        "scores": [
            { "student_id": carried, "ca1": 0, "ca2": 0, "exam": 48 },
            { "student_id": opted_out, "ca1": 0, "ca2": 0, "exam": 48, "carry_forward": false }
        ],
        "subject_id": subject_id,
        "class_id": class_id,
        "academic_year": YEAR,
        "academic_term": TERM
    });
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::admin_request(
            Method::POST,
            "/api/admin/marks/terminal",
            Some(terminal),
        ))
        .await
        .expect("submit terminal");
    let status = response.status();
    let saved = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {saved}");
    assert_eq!(saved["count"], 2);

    let (ca1, ca2, total, grade): (f64, f64, f64, String) = sqlx::query_as(
        "SELECT ca1, ca2, total, grade FROM terminal_scores WHERE student_id = $1",
    )
    .bind(&carried)
    .fetch_one(db)
    .await
    .expect("carried row");
    assert_eq!((ca1, ca2, total, grade.as_str()), (17.0, 15.0, 80.0, "A"));

    let (ca1, ca2): (f64, f64) =
        sqlx::query_as("SELECT ca1, ca2 FROM terminal_scores WHERE student_id = $1")
            .bind(&opted_out)
            .fetch_one(db)
            .await
            .expect("opted out row");
    assert_eq!((ca1, ca2), (0.0, 0.0));
}

#[tokio::test]
async fn class_name_with_section_resolves_to_matching_class() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();

    let silver = test_support::insert_class(db, "JSS 1", "Silver").await;
    let gold = test_support::insert_class(db, "JSS 1", "Gold").await;
    let subject_id = test_support::insert_subject(db, "Biology", "BIO1").await;
    let student_id = test_support::insert_student(db, "Efe", "Uche", &gold).await;

    let payload = json!({
        "scores": [{ "student_id": student_id, "ca1": 5, "ca2": 5, "exam": 10 }],
        "subject_id": subject_id,
        "class_name": "JSS 1 Gold",
        "academic_year": YEAR,
        "academic_term": TERM
    });
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::admin_request(
            Method::POST,
            "/api/admin/marks/midterm",
            Some(payload),
        ))
        .await
        .expect("submit midterm");

    let saved = test_support::read_json(response).await;
    assert_eq!(saved["class_id"], gold.as_str());
    assert_ne!(saved["class_id"], silver.as_str());

    let response = ctx
        .app
        .oneshot(test_support::admin_request(
            Method::GET,
            "/api/admin/marks/midterm?class_name=JSS%201&section=Gold&getStudentsList=true",
            None,
        ))
        .await
        .expect("list students");
    let students = test_support::read_json(response).await;
    assert_eq!(students, json!([{ "student_id": student_id, "student_name": "Efe Uche" }]));
}

#[tokio::test]
async fn exam_is_inferred_when_unique() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();

    let class_id = test_support::insert_class(db, "JSS 3", "").await;
    let subject_id = test_support::insert_subject(db, "Chemistry", "CHM3").await;
    let student_id = test_support::insert_student(db, "Femi", "Bello", &class_id).await;
    let exam_id = test_support::insert_exam(db, MarkType::Midterm, YEAR, TERM, "ALL").await;
    test_support::insert_exam(db, MarkType::Terminal, YEAR, TERM, "ALL").await;

    let payload = json!({
        "scores": [{ "student_id": student_id, "ca1": 5 }],
        "subject_id": subject_id,
        "class_id": class_id,
        "academic_year": YEAR,
        "academic_term": TERM
    });
    let response = ctx
        .app
        .oneshot(test_support::admin_request(
            Method::POST,
            "/api/admin/marks/midterm",
            Some(payload),
        ))
        .await
        .expect("submit midterm");

    let saved = test_support::read_json(response).await;
    assert_eq!(saved["exam_id"], exam_id.as_str());
}

#[tokio::test]
async fn lookup_failures_are_bad_requests_and_write_nothing() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();

    let class_id = test_support::insert_class(db, "JSS 1", "").await;
    let subject_id = test_support::insert_subject(db, "Civics", "CIV1").await;
    let student_id = test_support::insert_student(db, "Gina", "Ibe", &class_id).await;

    let cases = [
        (
            json!({
                "scores": [{ "student_id": student_id, "ca1": 5 }],
                "subject_id": subject_id,
                "class_name": "SSS 9",
                "academic_year": YEAR,
                "academic_term": TERM
            }),
            "Class not found: SSS 9",
        ),
        (
            json!({
                "scores": [{ "student_id": student_id, "ca1": 5 }],
                "subject_id": subject_id,
                "class_id": "no-such-class",
                "academic_year": YEAR,
                "academic_term": TERM
            }),
            "Class not found: no-such-class",
        ),
        (
            json!({
                "scores": [{ "student_id": student_id, "ca1": 5 }],
                "subject_id": "missing-subject",
                "class_id": class_id,
                "academic_year": YEAR,
                "academic_term": TERM
            }),
            "Subject not found: missing-subject",
        ),
        (
            json!({
                "scores": [
                    { "student_id": student_id, "ca1": 5 },
                    { "student_id": "ghost", "ca1": 5 }
                ],
                "subject_id": subject_id,
                "class_id": class_id,
                "academic_year": YEAR,
                "academic_term": TERM
            }),
            "Student not found: ghost",
        ),
        (
            json!({
                "scores": [],
                "subject_id": subject_id,
                "class_id": class_id,
                "academic_year": YEAR,
                "academic_term": TERM
            }),
            "scores must contain at least one entry",
        ),
        (
            json!({
                "scores": [{ "student_id": student_id }],
                "subject_id": subject_id,
                "academic_year": YEAR,
                "academic_term": TERM
            }),
            "class_id or class_name is required",
        ),
    ];

    for (payload, expected) in cases {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::admin_request(
                Method::POST,
                "/api/admin/marks/midterm",
                Some(payload),
            ))
            .await
            .expect("submit midterm");

        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
        assert_eq!(body["error"], expected);
        assert_eq!(body["status"], 400);
    }

    assert_eq!(count_rows(db, "midterm_scores").await, 0);
}

#[tokio::test]
async fn unknown_class_lists_nothing() {
    let ctx = test_support::setup_test_context().await;

    for uri in [
        "/api/admin/marks/terminal?class_name=Nowhere",
        "/api/admin/marks/terminal?class_id=no-such-class",
    ] {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::admin_request(Method::GET, uri, None))
            .await
            .expect("list terminal");

        assert_eq!(response.status(), StatusCode::OK, "{uri}");
        assert_eq!(test_support::read_json(response).await, json!([]));
    }
}
