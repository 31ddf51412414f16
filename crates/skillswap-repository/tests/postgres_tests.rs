//! Integration tests for PostgresStore
//!
//! These tests require a PostgreSQL database to be running.
//! Set the DATABASE_URL environment variable to run these tests:
//!
//! ```bash
//! export DATABASE_URL="postgresql://localhost/skillswap_test"
//! cargo test --package skillswap-repository --features postgres -- --ignored
//! ```

#[cfg(feature = "postgres")]
mod postgres_tests {
    use chrono::{Duration, Utc};
    use skillswap_core::*;
    use skillswap_repository::{
        BookingRepository, CatalogRepository, PersonRepository, PostgresStore, RepositoryError,
        SessionRepository, SuggestionRepository,
    };

    fn get_database_url() -> String {
        std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgresql://localhost/skillswap_test".to_string())
    }

    /// Connect, migrate and wipe all tables
    async fn setup_test_db() -> PostgresStore {
        let store = PostgresStore::connect(&get_database_url(), 2)
            .await
            .expect("Failed to connect to test database. Make sure PostgreSQL is running and DATABASE_URL is set correctly.");
        store.migrate().await.expect("Failed to run migrations");
        store
    }

    fn unique_email(prefix: &str) -> String {
        format!("{}-{}@example.com", prefix, Utc::now().timestamp_nanos_opt().unwrap_or_default())
    }

    fn new_person(email: String, credits: i64) -> NewPerson {
        NewPerson {
            email,
            display_name: "Test Person".to_string(),
            password_hash: "hash".to_string(),
            account_role: AccountRole::User,
            profile: Some(RoleProfile::Instructor),
            credits,
            email_verified: true,
        }
    }

    async fn seed_session(store: &PostgresStore, instructor: PersonId) -> LearningSession {
        let area = store
            .insert_knowledge_area(NewKnowledgeArea {
                name: format!("Area {}", Utc::now().timestamp_nanos_opt().unwrap_or_default()),
                description: None,
            })
            .await
            .unwrap();
        let skill = store
            .insert_skill(NewSkill {
                knowledge_area_id: area.id,
                name: "Rust".to_string(),
                description: None,
            })
            .await
            .unwrap();
        let now = Utc::now();
        store
            .insert_session(
                instructor,
                &NewSession {
                    skill_id: skill.id,
                    title: "Lifetimes".to_string(),
                    description: None,
                    capacity: 1,
                    starts_at: now + Duration::days(1),
                    ends_at: now + Duration::days(1) + Duration::hours(1),
                    exchange_type: ExchangeType::Paid,
                    credits_cost: 3,
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_insert_and_find_person() {
        let store = setup_test_db().await;
        let email = unique_email("find");
        let person = store.insert_person(new_person(email.clone(), 10)).await.unwrap();

        let loaded = store.find_person_by_email(&email).await.unwrap().unwrap();
        assert_eq!(loaded.id, person.id);
        assert_eq!(loaded.profile, Some(RoleProfile::Instructor));
        assert!(loaded.enabled);
        assert!(!loaded.locked);
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_duplicate_email_conflicts() {
        let store = setup_test_db().await;
        let email = unique_email("dup");
        store.insert_person(new_person(email.clone(), 0)).await.unwrap();

        let result = store.insert_person(new_person(email, 0)).await;
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_adjust_credits_refuses_negative_balance() {
        let store = setup_test_db().await;
        let person = store
            .insert_person(new_person(unique_email("credits"), 5))
            .await
            .unwrap();

        assert_eq!(store.adjust_credits(person.id, -3).await.unwrap(), 2);

        let result = store.adjust_credits(person.id, -3).await;
        assert!(matches!(
            result,
            Err(RepositoryError::InsufficientCredits { balance: 2, requested: 3, .. })
        ));

        let missing = store.adjust_credits(-1, 1).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound { .. })));
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_one_active_booking_per_learner() {
        let store = setup_test_db().await;
        let instructor = store
            .insert_person(new_person(unique_email("instructor"), 0))
            .await
            .unwrap();
        let learner = store
            .insert_person(new_person(unique_email("learner"), 10))
            .await
            .unwrap();
        let session = seed_session(&store, instructor.id).await;

        let booking = NewBooking {
            session_id: session.id,
            learner_id: learner.id,
            status: BookingStatus::Confirmed,
            credits_charged: 3,
        };
        let mut first = store.insert_booking(booking.clone()).await.unwrap();
        assert!(matches!(
            store.insert_booking(booking.clone()).await,
            Err(RepositoryError::Conflict(_))
        ));
        assert_eq!(store.count_confirmed(session.id).await.unwrap(), 1);

        // A cancelled booking frees the slot for a new one
        first.cancel(Utc::now()).unwrap();
        store.update_booking(&first).await.unwrap();
        store.insert_booking(booking).await.unwrap();
    }

    #[tokio::test]
    #[ignore] // Requires database setup
    async fn test_upsert_suggestion_keeps_viewed_flag() {
        let store = setup_test_db().await;
        let instructor = store
            .insert_person(new_person(unique_email("s-instructor"), 0))
            .await
            .unwrap();
        let learner = store
            .insert_person(new_person(unique_email("s-learner"), 0))
            .await
            .unwrap();
        let session = seed_session(&store, instructor.id).await;

        let suggestion = store.upsert_suggestion(learner.id, session.id).await.unwrap();
        store.mark_suggestion_viewed(suggestion.id).await.unwrap();

        let again = store.upsert_suggestion(learner.id, session.id).await.unwrap();
        assert_eq!(again.id, suggestion.id);
        assert!(again.viewed);
    }
}
