use std::io::Cursor;

use quiz_bank::domain::types::{CategoryName, Email, Username};
use quiz_bank::domain::user::NewUser;
use quiz_bank::forms::import_export::{UploadFormat, decode_rows};
use quiz_bank::repository::{
    CategorizedQuestionQuery, CategoryReader, DieselRepository, QuestionReader, UserWriter,
};
use quiz_bank::services::import_export::ingest_questions;

mod common;

fn owner(repo: &DieselRepository) -> quiz_bank::domain::types::UserId {
    repo.create_user(&NewUser {
        username: Username::new("quizmaster").unwrap(),
        email: Email::new("quizmaster@example.com").unwrap(),
        password_hash: "hash".to_string(),
        profile_picture: None,
    })
    .expect("should create user")
    .id
}

#[test]
fn csv_upload_persists_valid_rows_and_counts_raw_rows() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let user_id = owner(&repo);

    let csv = "questionText,categories\n2+2=?,\"MATH, BASIC\"\n,MATH\n";
    let rows = decode_rows(Cursor::new(csv), UploadFormat::Csv).expect("valid csv");
    let report = ingest_questions(user_id, rows, &repo).expect("ingest");

    assert_eq!(report.total_rows, 2);
    assert_eq!(report.created, 1);
    assert_eq!(report.skipped, 1);

    for name in ["MATH", "BASIC"] {
        assert!(
            repo.get_category_by_name(&CategoryName::new(name).unwrap())
                .expect("lookup")
                .is_some(),
            "{name} should exist"
        );
    }

    let items = repo
        .list_categorized_questions(CategorizedQuestionQuery::new(user_id))
        .expect("list");
    let names: Vec<&str> = items.iter().map(|i| i.category_name.as_str()).collect();
    assert_eq!(names, vec!["BASIC", "MATH"]);
}

#[test]
fn repeated_batches_reuse_categories_case_insensitively() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());
    let user_id = owner(&repo);

    let first = "questionText,categories\nq1,math\nq2,Math\n";
    let second = "questionText,categories\nq3,\" MATH ,science\"\n";
    for csv in [first, second] {
        let rows = decode_rows(Cursor::new(csv), UploadFormat::Csv).expect("valid csv");
        ingest_questions(user_id, rows, &repo).expect("ingest");
    }

    let categories = repo
        .list_categories_by_names(&[
            CategoryName::new("MATH").unwrap(),
            CategoryName::new("SCIENCE").unwrap(),
        ])
        .expect("list");
    assert_eq!(categories.len(), 2);

    let items = repo
        .list_categorized_questions(
            CategorizedQuestionQuery::new(user_id).category(CategoryName::new("math").unwrap()),
        )
        .expect("list");
    let texts: Vec<&str> = items.iter().map(|i| i.question_text.as_str()).collect();
    assert_eq!(texts, vec!["q1", "q2", "q3"]);
}
