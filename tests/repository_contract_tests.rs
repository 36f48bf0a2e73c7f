use chrono::{Duration, Utc};

use quizflow_server::{
    db::SqliteDb,
    errors::AppError,
    models::domain::{
        Answer, GradeReport, Lesson, LessonContent, MediaFile, Question, QuestionType, Quiz,
        QuizResult, SubmittedAnswer,
    },
    repositories::Storage,
};

fn backends() -> Vec<Storage> {
    vec![
        Storage::memory(),
        Storage::sqlite(SqliteDb::open_in_memory().expect("in-memory sqlite should open")),
    ]
}

fn make_quiz(lesson_id: &str, title: &str) -> Quiz {
    let mut question = Question::new(QuestionType::Single, 1);
    question.text = "2 + 2?".to_string();
    question.answers = vec![
        Answer {
            text: "4".to_string(),
            is_correct: true,
            ..Answer::blank()
        },
        Answer {
            text: "5".to_string(),
            ..Answer::blank()
        },
    ];
    Quiz::new(lesson_id, title, vec![question])
}

fn make_result(quiz_id: &str, percentage: u32, minutes_ago: i64) -> QuizResult {
    let report = GradeReport {
        score: percentage,
        max_score: 100,
        percentage,
        passed: percentage >= 70,
        results: vec![],
    };
    let mut result = QuizResult::from_report(
        quiz_id,
        "Student",
        vec![SubmittedAnswer::single(0, "a")],
        &report,
    );
    result.submitted_at = Utc::now() - Duration::minutes(minutes_ago);
    result
}

#[tokio::test]
async fn lesson_repository_crud_and_error_paths() {
    for storage in backends() {
        let backend = storage.backend.as_str();
        let repo = storage.lessons;

        let mut content = LessonContent::default();
        content.html = "<p>Hello</p>".to_string();
        let lesson = repo
            .create(Lesson::new("Intro", content))
            .await
            .expect("create lesson");

        let found = repo
            .find_by_id(&lesson.id)
            .await
            .expect("find should work")
            .expect("lesson should exist");
        assert_eq!(found.title, "Intro", "{}", backend);
        assert_eq!(found.content.html, "<p>Hello</p>", "{}", backend);

        let mut renamed = found.clone();
        renamed.title = "Introduction".to_string();
        renamed.order = 3;
        let updated = repo.update(renamed).await.expect("update should work");
        assert_eq!(updated.title, "Introduction", "{}", backend);
        assert_eq!(
            repo.find_by_id(&lesson.id).await.unwrap().unwrap().order,
            3,
            "{}",
            backend
        );

        let missing = repo
            .update(Lesson::new("Ghost", LessonContent::default()))
            .await;
        assert!(matches!(missing, Err(AppError::NotFound(_))), "{}", backend);

        assert_eq!(repo.count().await.unwrap(), 1, "{}", backend);
        assert!(repo.delete(&lesson.id).await.unwrap(), "{}", backend);
        assert!(!repo.delete(&lesson.id).await.unwrap(), "{}", backend);
        assert!(repo.find_all().await.unwrap().is_empty(), "{}", backend);
    }
}

#[tokio::test]
async fn quiz_repository_enforces_one_quiz_per_lesson() {
    for storage in backends() {
        let backend = storage.backend.as_str();
        let repo = storage.quizzes;

        let quiz = repo
            .create(make_quiz("lesson-1", "First"))
            .await
            .expect("create quiz");

        let duplicate = repo.create(make_quiz("lesson-1", "Second")).await;
        assert!(
            matches!(duplicate, Err(AppError::ValidationError(_))),
            "{}",
            backend
        );

        let by_lesson = repo
            .find_by_lesson("lesson-1")
            .await
            .unwrap()
            .expect("quiz by lesson");
        assert_eq!(by_lesson.id, quiz.id, "{}", backend);
        assert_eq!(by_lesson.questions, quiz.questions, "{}", backend);
        assert!(repo.find_by_lesson("lesson-2").await.unwrap().is_none());

        let mut edited = by_lesson.clone();
        edited.passing_score = 50;
        repo.update(edited).await.expect("update should work");
        assert_eq!(
            repo.find_by_id(&quiz.id).await.unwrap().unwrap().passing_score,
            50,
            "{}",
            backend
        );

        let missing = repo.update(make_quiz("lesson-9", "Ghost")).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))), "{}", backend);

        assert!(repo.delete(&quiz.id).await.unwrap(), "{}", backend);
        assert_eq!(repo.count().await.unwrap(), 0, "{}", backend);
    }
}

#[tokio::test]
async fn quiz_result_repository_orders_newest_first_and_averages() {
    for storage in backends() {
        let backend = storage.backend.as_str();
        let repo = storage.results;

        assert!(repo.average_percentage().await.unwrap().is_none(), "{}", backend);

        let older = repo.create(make_result("quiz-1", 40, 10)).await.unwrap();
        let newer = repo.create(make_result("quiz-1", 80, 1)).await.unwrap();
        repo.create(make_result("quiz-2", 60, 5)).await.unwrap();

        let results = repo.find_by_quiz("quiz-1").await.unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec![newer.id.as_str(), older.id.as_str()], "{}", backend);

        let average = repo.average_percentage().await.unwrap().unwrap();
        assert!((average - 60.0).abs() < f64::EPSILON, "{}", backend);

        assert_eq!(repo.delete_by_quiz("quiz-1").await.unwrap(), 2, "{}", backend);
        assert_eq!(repo.count().await.unwrap(), 1, "{}", backend);
    }
}

#[tokio::test]
async fn media_repository_tracks_files_by_stored_name() {
    for storage in backends() {
        let backend = storage.backend.as_str();
        let repo = storage.media;

        let mut older = MediaFile::new("1-0.png", "cat.png", "image/png", 10);
        older.created_at = Utc::now() - Duration::minutes(5);
        repo.create(older).await.unwrap();
        repo.create(MediaFile::new("2-0.pdf", "notes.pdf", "application/pdf", 20))
            .await
            .unwrap();

        let found = repo
            .find_by_filename("1-0.png")
            .await
            .unwrap()
            .expect("media by filename");
        assert_eq!(found.original_name, "cat.png", "{}", backend);
        assert_eq!(found.media_type, "image", "{}", backend);

        let all = repo.find_all().await.unwrap();
        assert_eq!(all[0].filename, "2-0.pdf", "{}", backend);

        assert!(repo.delete_by_filename("1-0.png").await.unwrap(), "{}", backend);
        assert!(!repo.delete_by_filename("1-0.png").await.unwrap(), "{}", backend);
        assert_eq!(repo.count().await.unwrap(), 1, "{}", backend);
    }
}
