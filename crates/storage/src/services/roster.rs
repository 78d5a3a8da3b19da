use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::repository::participant::ParticipantRepository;
use crate::repository::race::RaceRepository;
use crate::repository::registration::RegistrationRepository;

/// One parsed participant line from an import file.
struct RosterLine {
    first_name: String,
    last_name: String,
    gender: Option<String>,
    birth_year: Option<i32>,
    country: Option<String>,
    bib: Option<String>,
}

/// Split one CSV line, honouring double-quoted fields: embedded commas
/// stay inside the field and `""` unescapes to a literal quote.
fn split_row(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if quoted => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cell.push('"');
                } else {
                    quoted = false;
                }
            }
            '"' if cell.is_empty() => quoted = true,
            ',' if !quoted => cells.push(std::mem::take(&mut cell)),
            c => cell.push(c),
        }
    }
    cells.push(cell);

    cells
}

/// Quote a field when it contains a comma, quote or line break.
fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Header-driven comma-separated parse. Accepts `firstname`/`first_name`
/// style headers case-insensitively; unknown columns are ignored.
fn parse_roster(csv_data: &str) -> Result<Vec<RosterLine>> {
    let mut lines = csv_data.trim().lines();
    let Some(header) = lines.next() else {
        return Ok(Vec::new());
    };

    let headers: Vec<String> = split_row(header)
        .iter()
        .map(|h| h.trim().to_lowercase().replace('_', ""))
        .collect();

    let field = |cells: &[String], name: &str| -> Option<String> {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| cells.get(i))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let mut parsed = Vec::new();
    for (line_no, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let cells = split_row(line);

        let birth_year = match field(&cells, "birthyear") {
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                StorageError::Validation(format!(
                    "line {}: invalid birth year '{raw}'",
                    line_no + 2
                ))
            })?),
            None => None,
        };

        parsed.push(RosterLine {
            first_name: field(&cells, "firstname").unwrap_or_default(),
            last_name: field(&cells, "lastname").unwrap_or_default(),
            gender: field(&cells, "gender"),
            birth_year,
            country: field(&cells, "country"),
            bib: field(&cells, "bib"),
        });
    }

    Ok(parsed)
}

/// Import participants (and registrations when a bib is present) from CSV.
/// The whole file commits or none of it does.
pub async fn import_participants(pool: &SqlitePool, race_id: Uuid, csv_data: &str) -> Result<u64> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }

    let roster = parse_roster(csv_data)?;

    let now = Utc::now();
    let mut tx = pool.begin().await?;
    let mut count = 0u64;

    for line in &roster {
        let participant_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO participants (participant_id, race_id, first_name, last_name, gender, birth_year, country, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(participant_id)
        .bind(race_id)
        .bind(&line.first_name)
        .bind(&line.last_name)
        .bind(&line.gender)
        .bind(line.birth_year)
        .bind(&line.country)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if let Some(bib) = &line.bib {
            sqlx::query(
                r#"
                INSERT INTO registrations (registration_id, participant_id, bib, wave, created_at)
                VALUES (?, ?, ?, NULL, ?)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(participant_id)
            .bind(bib)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        count += 1;
    }

    tx.commit().await?;

    tracing::info!(%race_id, count, "participants imported");

    Ok(count)
}

/// Participant roster as CSV, bib from the earliest registration.
pub async fn export_participants(pool: &SqlitePool, race_id: Uuid) -> Result<String> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }

    let participants = ParticipantRepository::new(pool).list_for_race(race_id).await?;
    let registrations = RegistrationRepository::new(pool);

    let mut csv = String::from("firstName,lastName,gender,birthYear,country,bib\n");

    for participant in &participants {
        let bib = registrations
            .find_for_participant(participant.participant_id)
            .await?
            .map(|r| r.bib)
            .unwrap_or_default();

        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            escape_csv(&participant.first_name),
            escape_csv(&participant.last_name),
            escape_csv(participant.gender.as_deref().unwrap_or("")),
            participant
                .birth_year
                .map(|y| y.to_string())
                .unwrap_or_default(),
            escape_csv(participant.country.as_deref().unwrap_or("")),
            escape_csv(&bib),
        ));
    }

    Ok(csv)
}

#[derive(sqlx::FromRow)]
struct ResultExportRow {
    place: Option<i32>,
    bib: Option<String>,
    first_name: String,
    last_name: String,
    category: Option<String>,
    gun_time_ms: Option<i64>,
    chip_time_ms: Option<i64>,
    net_time_ms: Option<i64>,
}

/// Results as CSV in the stable column order
/// `place,bib,firstName,lastName,category,gunTime,chipTime,netTime`,
/// times rendered in seconds.
pub async fn export_results(pool: &SqlitePool, race_id: Uuid) -> Result<String> {
    if !RaceRepository::new(pool).exists(race_id).await? {
        return Err(StorageError::NotFound("race"));
    }

    let rows: Vec<ResultExportRow> = sqlx::query_as(
        r#"
        SELECT rc.place, r.bib, p.first_name, p.last_name, rc.category,
               rc.gun_time_ms, rc.chip_time_ms, rc.net_time_ms
        FROM result_cache rc
        INNER JOIN participants p ON rc.participant_id = p.participant_id
        LEFT JOIN registrations r ON rc.registration_id = r.registration_id
        WHERE rc.race_id = ?
        ORDER BY rc.place IS NULL, rc.place
        "#,
    )
    .bind(race_id)
    .fetch_all(pool)
    .await?;

    let mut csv = String::from("place,bib,firstName,lastName,category,gunTime,chipTime,netTime\n");

    for row in &rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            row.place.map(|p| p.to_string()).unwrap_or_default(),
            escape_csv(row.bib.as_deref().unwrap_or("")),
            escape_csv(&row.first_name),
            escape_csv(&row.last_name),
            escape_csv(row.category.as_deref().unwrap_or("")),
            row.gun_time_ms.map(seconds_display).unwrap_or_default(),
            row.chip_time_ms.map(seconds_display).unwrap_or_default(),
            row.net_time_ms.map(seconds_display).unwrap_or_default(),
        ));
    }

    Ok(csv)
}

/// Milliseconds as seconds for the display unit, dropping a trailing
/// fraction when the value is whole.
fn seconds_display(ms: i64) -> String {
    if ms % 1000 == 0 {
        (ms / 1000).to_string()
    } else {
        format!("{}", ms as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_variants() {
        let csv = "first_name,LAST_NAME,gender,birthYear,country,bib\nAda,Lovelace,F,1990,GB,101\n";
        let lines = parse_roster(csv).unwrap();

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].first_name, "Ada");
        assert_eq!(lines[0].last_name, "Lovelace");
        assert_eq!(lines[0].gender.as_deref(), Some("F"));
        assert_eq!(lines[0].birth_year, Some(1990));
        assert_eq!(lines[0].bib.as_deref(), Some("101"));
    }

    #[test]
    fn quoted_fields_keep_their_commas() {
        let csv = "firstName,lastName\nAda,\"Lovelace, Countess\"\n";
        let lines = parse_roster(csv).unwrap();

        assert_eq!(lines[0].first_name, "Ada");
        assert_eq!(lines[0].last_name, "Lovelace, Countess");
    }

    #[test]
    fn doubled_quotes_unescape() {
        assert_eq!(
            split_row(r#"a,"say ""hi""",b"#),
            vec!["a", "say \"hi\"", "b"]
        );
    }

    #[test]
    fn escapes_commas_and_quotes() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn rejects_bad_birth_year() {
        let csv = "firstname,lastname,birthyear\nAda,Lovelace,ninety\n";
        assert!(parse_roster(csv).is_err());
    }

    #[test]
    fn seconds_drop_trailing_zeroes() {
        assert_eq!(seconds_display(3_699_000), "3699");
        assert_eq!(seconds_display(3_699_500), "3699.5");
        assert_eq!(seconds_display(1_234), "1.234");
    }
}
