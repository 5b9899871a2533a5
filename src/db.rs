use crate::config::DatabaseConfig;
use crate::error::ApiError;
use crate::models::{Choice, NewQuestion, Question, QuestionWithChoices};
use crate::store::QuizStore;
use async_trait::async_trait;
use deadpool_postgres::{Config, Object, Pool, PoolConfig, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::Row;
use tracing::{error, info};

/// Schema statements, applied in order at start-up.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "questions table",
        r#"
            CREATE TABLE IF NOT EXISTS questions (
                id SERIAL PRIMARY KEY,
                question_text VARCHAR(500) NOT NULL
            )
        "#,
    ),
    (
        "questions id index",
        "CREATE INDEX IF NOT EXISTS idx_questions_id ON questions(id)",
    ),
    (
        "choices table",
        r#"
            CREATE TABLE IF NOT EXISTS choices (
                id SERIAL PRIMARY KEY,
                choice_text VARCHAR(255) NOT NULL,
                is_correct BOOLEAN NOT NULL DEFAULT FALSE,
                question_id INTEGER NOT NULL REFERENCES questions(id)
            )
        "#,
    ),
    (
        "choices id index",
        "CREATE INDEX IF NOT EXISTS idx_choices_id ON choices(id)",
    ),
    (
        "choices question_id index",
        "CREATE INDEX IF NOT EXISTS idx_choices_question_id ON choices(question_id)",
    ),
];

/// PostgreSQL-backed quiz store.
/// Holds a deadpool `Pool`; every operation borrows one connection and
/// hands it back when the call returns.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Build the connection pool and verify it with a round trip.
    ///
    /// # Arguments
    /// * `config` - The database configuration
    pub async fn new(config: DatabaseConfig) -> Result<Self, ApiError> {
        info!("Creating PostgreSQL connection pool for host: {}:{}", config.host, config.port);

        let pool = Self::create_pool(config)?;

        let db = Database { pool };
        db.test_connection().await?;

        Ok(db)
    }

    fn create_pool(config: DatabaseConfig) -> Result<Pool, ApiError> {
        let mut pg_config = Config::new();

        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);

        pg_config.ssl_mode = Some(match config.ssl_mode.as_str() {
            "disable" => deadpool_postgres::SslMode::Disable,
            "allow" | "prefer" => deadpool_postgres::SslMode::Prefer,
            "require" => deadpool_postgres::SslMode::Require,
            // Never downgrade a request for certificate verification
            other => {
                error!("SSL mode '{}' is not supported by the driver", other);
                return Err(ApiError::Database(format!("Unsupported SSL mode: {}", other)));
            }
        });

        pg_config.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        let mut pool_config = PoolConfig::new(config.max_connections as usize);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pool_config.timeouts.create = Some(config.connection_timeout);
        pg_config.pool = Some(pool_config);

        let tls_connector = TlsConnector::builder()
            .build()
            .map_err(|e| {
                error!("Failed to create TLS connector: {}", e);
                ApiError::Database(format!("TLS connector creation failed: {}", e))
            })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls)
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                ApiError::Database(format!("Connection pool creation failed: {}", e))
            })
    }

    async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// Create the quiz tables and indexes if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), ApiError> {
        info!("Running database migrations");

        let client = self.get_connection().await?;

        for (name, statement) in MIGRATIONS {
            client.execute(*statement, &[])
                .await
                .map_err(|e| {
                    error!("Failed to create {}: {}", name, e);
                    ApiError::Database(format!("Migration of {} failed: {}", name, e))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    pub async fn test_connection(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[])
            .await
            .map_err(|e| {
                error!("Database connection test failed: {}", e);
                ApiError::Database(format!("Connection test failed: {}", e))
            })?;

        info!("Database connection test successful");
        Ok(())
    }
}

fn question_from_row(row: &Row) -> Question {
    Question {
        id: row.get(0),
        question_text: row.get(1),
    }
}

fn choice_from_row(row: &Row) -> Choice {
    Choice {
        id: row.get(0),
        choice_text: row.get(1),
        is_correct: row.get(2),
        question_id: row.get(3),
    }
}

#[async_trait]
impl QuizStore for Database {
    /// Parent row and child rows go through one transaction; an early
    /// return drops it uncommitted, which rolls everything back.
    async fn create_question(&self, new_question: NewQuestion) -> Result<Question, ApiError> {
        let mut client = self.get_connection().await?;
        let transaction = client.transaction().await.map_err(ApiError::from)?;

        let row = transaction
            .query_one(
                "INSERT INTO questions (question_text) VALUES ($1) RETURNING id, question_text",
                &[&new_question.question_text],
            )
            .await
            .map_err(ApiError::from)?;
        let question = question_from_row(&row);

        let insert_choice = transaction
            .prepare("INSERT INTO choices (choice_text, is_correct, question_id) VALUES ($1, $2, $3)")
            .await
            .map_err(ApiError::from)?;

        for choice in &new_question.choices {
            transaction
                .execute(&insert_choice, &[&choice.choice_text, &choice.is_correct, &question.id])
                .await
                .map_err(ApiError::from)?;
        }

        transaction.commit().await.map_err(ApiError::from)?;

        info!(
            "Created question with id: {} ({} choices)",
            question.id,
            new_question.choices.len()
        );
        Ok(question)
    }

    async fn get_question(&self, question_id: i32) -> Result<QuestionWithChoices, ApiError> {
        let client = self.get_connection().await?;

        let row = client
            .query_opt(
                "SELECT id, question_text FROM questions WHERE id = $1",
                &[&question_id],
            )
            .await
            .map_err(ApiError::from)?;

        let Some(row) = row else {
            return Err(ApiError::not_found(format!("Question {}", question_id)));
        };
        let question = question_from_row(&row);

        let rows = client
            .query(
                "SELECT id, choice_text, is_correct, question_id FROM choices WHERE question_id = $1 ORDER BY id",
                &[&question_id],
            )
            .await
            .map_err(ApiError::from)?;

        let choices = rows.iter().map(choice_from_row).collect();

        Ok(QuestionWithChoices { question, choices })
    }

    async fn health_check(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[])
            .await
            .map_err(|e| {
                error!("Database health check failed: {}", e);
                ApiError::Database(format!("Health check failed: {}", e))
            })?;

        Ok(())
    }
}

// These run against a real server and are skipped unless TEST_DATABASE_URL is set.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::map_lookup;
    use crate::models::question::MAX_CHOICE_TEXT_LEN;
    use std::collections::HashMap;
    use crate::models::NewChoice;

    async fn test_database() -> Option<Database> {
        let url = std::env::var("TEST_DATABASE_URL").ok()?;
        let vars = map_lookup(HashMap::from([("DATABASE_URL".to_string(), url)]));
        let config = DatabaseConfig::from_lookup(&vars).expect("invalid TEST_DATABASE_URL");
        let db = Database::new(config).await.expect("failed to connect to test database");
        db.migrate().await.expect("failed to migrate test database");
        Some(db)
    }

    async fn count_questions_with_text(db: &Database, text: &str) -> i64 {
        let client = db.get_connection().await.unwrap();
        let row = client
            .query_one("SELECT COUNT(*) FROM questions WHERE question_text = $1", &[&text])
            .await
            .unwrap();
        row.get(0)
    }

    fn marker(label: &str) -> String {
        format!("{} {}", label, uuid::Uuid::new_v4())
    }

    #[test]
    fn test_verification_ssl_modes_do_not_build_a_pool() {
        for mode in ["verify-ca", "verify-full"] {
            let config = DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                database: "quizzes".to_string(),
                username: "quiz".to_string(),
                password: "secret".to_string(),
                ssl_mode: mode.to_string(),
                max_connections: 1,
                connection_timeout: std::time::Duration::from_secs(1),
            };

            assert!(matches!(Database::create_pool(config), Err(ApiError::Database(_))));
        }
    }

    #[tokio::test]
    async fn test_create_and_get_question() {
        let Some(db) = test_database().await else {
            eprintln!("TEST_DATABASE_URL not set, skipping");
            return;
        };

        let text = marker("Round trip");
        let created = db
            .create_question(NewQuestion {
                question_text: text.clone(),
                choices: vec![
                    NewChoice { choice_text: "yes".to_string(), is_correct: true },
                    NewChoice { choice_text: "no".to_string(), is_correct: false },
                ],
            })
            .await
            .unwrap();

        let fetched = db.get_question(created.id).await.unwrap();
        assert_eq!(fetched.question.question_text, text);
        assert_eq!(fetched.choices.len(), 2);
        assert_eq!(fetched.choices[0].choice_text, "yes");
        assert!(fetched.choices[0].is_correct);
        assert_eq!(fetched.choices[1].choice_text, "no");
        assert!(!fetched.choices[1].is_correct);
    }

    #[tokio::test]
    async fn test_failed_create_rolls_back() {
        let Some(db) = test_database().await else {
            eprintln!("TEST_DATABASE_URL not set, skipping");
            return;
        };

        let text = marker("Rollback");
        let result = db
            .create_question(NewQuestion {
                question_text: text.clone(),
                choices: vec![
                    NewChoice { choice_text: "fine".to_string(), is_correct: true },
                    NewChoice { choice_text: "x".repeat(MAX_CHOICE_TEXT_LEN + 1), is_correct: false },
                ],
            })
            .await;

        assert!(matches!(result, Err(ApiError::Database(_))));
        assert_eq!(count_questions_with_text(&db, &text).await, 0);
    }

    #[tokio::test]
    async fn test_missing_question_is_not_found() {
        let Some(db) = test_database().await else {
            eprintln!("TEST_DATABASE_URL not set, skipping");
            return;
        };

        let result = db.get_question(-1).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }
}
