use async_trait::async_trait;
use body_climate::survey::{
    AnswerSet, Quadrant, RepositoryError, SurveyId, SurveyRecord, SurveyRepository, SurveyVersion,
};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::info;
use uuid::Uuid;

/// Survey storage backed by the `surveys` table.
#[derive(Clone)]
pub(crate) struct PgSurveyRepository {
    pool: PgPool,
}

fn unavailable(error: sqlx::Error) -> RepositoryError {
    match error {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            RepositoryError::Corrupt(error.to_string())
        }
        other => RepositoryError::Unavailable(other.to_string()),
    }
}

impl PgSurveyRepository {
    /// Open a pool and bring the schema up to date.
    pub(crate) async fn connect(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, RepositoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(unavailable)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|error| RepositoryError::Unavailable(error.to_string()))?;

        info!(max_connections, "survey database ready");
        Ok(Self { pool })
    }
}

struct StoredRow {
    id: Uuid,
    version: String,
    ch: i32,
    dd: i32,
    type_code: String,
    answers: AnswerSet,
    created_at: DateTime<Utc>,
}

impl StoredRow {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let Json(answers) = row.try_get::<Json<AnswerSet>, _>("answers")?;
        Ok(Self {
            id: row.try_get("id")?,
            version: row.try_get("version")?,
            ch: row.try_get("ch")?,
            dd: row.try_get("dd")?,
            type_code: row.try_get("type_code")?,
            answers,
            created_at: row.try_get("created_at")?,
        })
    }

    /// Unknown quadrant codes fall back to the default profile; an unknown
    /// bank revision cannot be rendered and is reported as corrupt.
    fn into_record(self) -> Result<SurveyRecord, RepositoryError> {
        let version = self.version.parse::<SurveyVersion>().map_err(|error| {
            RepositoryError::Corrupt(format!("survey {}: {error}", self.id))
        })?;
        Ok(SurveyRecord {
            id: SurveyId(self.id),
            version,
            ch: self.ch,
            dd: self.dd,
            type_code: Quadrant::from_code_or_default(&self.type_code),
            answers: self.answers,
            created_at: self.created_at,
        })
    }
}

fn count(row: &PgRow) -> Result<u64, RepositoryError> {
    let total: i64 = row.try_get("total").map_err(unavailable)?;
    Ok(u64::try_from(total).unwrap_or_default())
}

#[async_trait]
impl SurveyRepository for PgSurveyRepository {
    async fn insert(&self, record: SurveyRecord) -> Result<SurveyRecord, RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO surveys (id, version, ch, dd, type_code, answers, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id.0)
        .bind(record.version.tag())
        .bind(record.ch)
        .bind(record.dd)
        .bind(record.type_code.code())
        .bind(Json(&record.answers))
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(unavailable)?;
        Ok(record)
    }

    async fn fetch(&self, id: &SurveyId) -> Result<Option<SurveyRecord>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, version, ch, dd, type_code, answers, created_at FROM surveys WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(unavailable)?;

        row.map(|row| {
            StoredRow::from_row(&row)
                .map_err(unavailable)?
                .into_record()
        })
        .transpose()
    }

    async fn count_all(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM surveys")
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)?;
        count(&row)
    }

    async fn count_by_type(&self, type_code: Quadrant) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM surveys WHERE type_code = $1")
            .bind(type_code.code())
            .fetch_one(&self.pool)
            .await
            .map_err(unavailable)?;
        count(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(version: &str, type_code: &str) -> StoredRow {
        StoredRow {
            id: Uuid::new_v4(),
            version: version.to_string(),
            ch: -4,
            dd: 2,
            type_code: type_code.to_string(),
            answers: AnswerSet::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn rows_map_onto_records() {
        let record = stored("mini", "CH").into_record().expect("valid row");
        assert_eq!(record.version, SurveyVersion::Mini);
        assert_eq!(record.type_code, Quadrant::ColdDamp);
        assert_eq!((record.ch, record.dd), (-4, 2));
    }

    #[test]
    fn unknown_type_codes_use_the_default_profile() {
        let record = stored("short", "XX").into_record().expect("valid row");
        assert_eq!(record.type_code, Quadrant::HeatDry);
    }

    #[test]
    fn unknown_versions_are_corrupt() {
        let error = stored("long", "HD").into_record().expect_err("bad version");
        assert!(matches!(error, RepositoryError::Corrupt(_)));
    }

    #[test]
    fn pool_errors_are_unavailable() {
        assert!(matches!(
            unavailable(sqlx::Error::PoolTimedOut),
            RepositoryError::Unavailable(_)
        ));
    }
}
