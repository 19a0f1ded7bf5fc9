//! Session Request Storage
//! Mission: Persist mentoring requests and guard the one-way status transition

use crate::requests::models::{
    MenteeRequestView, MentorProfile, MentorRequestView, RequestStatus, SessionRequest,
    StudentProfile,
};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Fields for a new request; status always starts at pending
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub mentor_id: Uuid,
    pub student_id: Uuid,
    pub date: String,
    pub time: String,
    pub doubt: String,
    pub student_number: String,
}

/// Request storage with SQLite backend. Shares the database file with
/// `UserStore` so listings can join counterparty profiles.
pub struct RequestStore {
    db_path: String,
}

impl RequestStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS requests (
                id TEXT PRIMARY KEY,
                mentor_id TEXT NOT NULL,
                student_id TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL,
                doubt TEXT NOT NULL,
                student_number TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Persist a new request in pending state
    pub fn create(&self, new_request: NewRequest) -> Result<SessionRequest> {
        let request = SessionRequest {
            id: Uuid::new_v4(),
            mentor_id: new_request.mentor_id,
            student_id: new_request.student_id,
            date: new_request.date,
            time: new_request.time,
            doubt: new_request.doubt,
            student_number: new_request.student_number,
            status: RequestStatus::Pending,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO requests (id, mentor_id, student_id, date, time, doubt,
                                   student_number, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                request.id.to_string(),
                request.mentor_id.to_string(),
                request.student_id.to_string(),
                request.date,
                request.time,
                request.doubt,
                request.student_number,
                request.status.as_str(),
                request.created_at,
            ],
        )
        .context("Failed to insert request")?;

        Ok(request)
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<SessionRequest>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, mentor_id, student_id, date, time, doubt,
                    student_number, status, created_at
             FROM requests WHERE id = ?1",
        )?;

        let result = stmt.query_row(params![id.to_string()], request_from_row);

        match result {
            Ok(request) => Ok(Some(request)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Move a pending request to a terminal state. The update is guarded on
    /// `status = 'pending'` so a request that is already terminal is left
    /// untouched and `false` is returned; between two racing transitions
    /// exactly one wins.
    pub fn transition(&self, id: &Uuid, to: RequestStatus) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;

        let updated = conn.execute(
            "UPDATE requests SET status = ?1 WHERE id = ?2 AND status = 'pending'",
            params![to.as_str(), id.to_string()],
        )?;

        Ok(updated > 0)
    }

    /// All requests sent by a mentee, newest-first, with the mentor's public
    /// profile joined in
    pub fn list_for_mentee(&self, student_id: &Uuid) -> Result<Vec<MenteeRequestView>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT r.id, r.mentor_id, r.student_id, r.date, r.time, r.doubt,
                    r.student_number, r.status, r.created_at,
                    u.full_name, u.email, u.branch
             FROM requests r
             JOIN users u ON u.id = r.mentor_id
             WHERE r.student_id = ?1
             ORDER BY r.created_at DESC, r.rowid DESC",
        )?;

        let views = stmt
            .query_map(params![student_id.to_string()], |row| {
                let request = request_from_row(row)?;
                let mentor = MentorProfile {
                    id: request.mentor_id,
                    full_name: row.get(9)?,
                    email: row.get(10)?,
                    branch: row.get(11)?,
                };
                Ok(MenteeRequestView { request, mentor })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(views)
    }

    /// All requests addressed to a mentor, newest-first, with the mentee's
    /// public profile joined in
    pub fn list_for_mentor(&self, mentor_id: &Uuid) -> Result<Vec<MentorRequestView>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT r.id, r.mentor_id, r.student_id, r.date, r.time, r.doubt,
                    r.student_number, r.status, r.created_at,
                    u.full_name, u.email, u.registration_number
             FROM requests r
             JOIN users u ON u.id = r.student_id
             WHERE r.mentor_id = ?1
             ORDER BY r.created_at DESC, r.rowid DESC",
        )?;

        let views = stmt
            .query_map(params![mentor_id.to_string()], |row| {
                let request = request_from_row(row)?;
                let student = StudentProfile {
                    id: request.student_id,
                    full_name: row.get(9)?,
                    email: row.get(10)?,
                    registration_number: row.get(11)?,
                };
                Ok(MentorRequestView { request, student })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(views)
    }
}

fn request_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRequest> {
    let parse_uuid = |idx: usize, s: String| {
        Uuid::parse_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    };

    let status_str: String = row.get(7)?;
    let status = RequestStatus::from_str(&status_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            rusqlite::types::Type::Text,
            format!("unknown status: {status_str}").into(),
        )
    })?;

    Ok(SessionRequest {
        id: parse_uuid(0, row.get(0)?)?,
        mentor_id: parse_uuid(1, row.get(1)?)?,
        student_id: parse_uuid(2, row.get(2)?)?,
        date: row.get(3)?,
        time: row.get(4)?,
        doubt: row.get(5)?,
        student_number: row.get(6)?,
        status,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;
    use crate::auth::user_store::{NewUser, UserStore};
    use tempfile::NamedTempFile;

    struct Fixture {
        users: UserStore,
        requests: RequestStore,
        _temp: NamedTempFile,
    }

    fn setup() -> Fixture {
        let temp = NamedTempFile::new().unwrap();
        let db_path = temp.path().to_str().unwrap();
        let users = UserStore::new(db_path).unwrap();
        let requests = RequestStore::new(db_path).unwrap();
        Fixture {
            users,
            requests,
            _temp: temp,
        }
    }

    fn make_user(users: &UserStore, email: &str, role: UserRole) -> Uuid {
        users
            .create_user(
                NewUser {
                    full_name: format!("User {email}"),
                    email: email.to_string(),
                    branch: "CSE".to_string(),
                    section: "A".to_string(),
                    registration_number: "RA001".to_string(),
                    role,
                },
                "pass",
            )
            .unwrap()
            .id
    }

    fn make_request(fx: &Fixture, mentor_id: Uuid, student_id: Uuid, doubt: &str) -> SessionRequest {
        fx.requests
            .create(NewRequest {
                mentor_id,
                student_id,
                date: "2024-05-01".to_string(),
                time: "10:00".to_string(),
                doubt: doubt.to_string(),
                student_number: "S123".to_string(),
            })
            .unwrap()
    }

    #[test]
    fn test_create_starts_pending() {
        let fx = setup();
        let mentor = make_user(&fx.users, "mentor@x.com", UserRole::Mentor);
        let student = make_user(&fx.users, "student@x.com", UserRole::Mentee);

        let request = make_request(&fx, mentor, student, "recursion");
        assert_eq!(request.status, RequestStatus::Pending);

        let stored = fx.requests.get(&request.id).unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
        assert_eq!(stored.doubt, "recursion");
    }

    #[test]
    fn test_transition_is_one_way() {
        let fx = setup();
        let mentor = make_user(&fx.users, "mentor@x.com", UserRole::Mentor);
        let student = make_user(&fx.users, "student@x.com", UserRole::Mentee);
        let request = make_request(&fx, mentor, student, "recursion");

        // pending -> accepted succeeds
        assert!(fx
            .requests
            .transition(&request.id, RequestStatus::Accepted)
            .unwrap());
        let stored = fx.requests.get(&request.id).unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Accepted);

        // accepted -> rejected is refused and leaves the row untouched
        assert!(!fx
            .requests
            .transition(&request.id, RequestStatus::Rejected)
            .unwrap());
        let stored = fx.requests.get(&request.id).unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Accepted);
    }

    #[test]
    fn test_transition_unknown_id_is_noop() {
        let fx = setup();
        assert!(!fx
            .requests
            .transition(&Uuid::new_v4(), RequestStatus::Accepted)
            .unwrap());
    }

    #[test]
    fn test_listings_join_profiles_newest_first() {
        let fx = setup();
        let mentor = make_user(&fx.users, "mentor@x.com", UserRole::Mentor);
        let student = make_user(&fx.users, "student@x.com", UserRole::Mentee);

        let first = make_request(&fx, mentor, student, "first");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = make_request(&fx, mentor, student, "second");

        let mentee_view = fx.requests.list_for_mentee(&student).unwrap();
        assert_eq!(mentee_view.len(), 2);
        assert_eq!(mentee_view[0].request.id, second.id);
        assert_eq!(mentee_view[1].request.id, first.id);
        assert_eq!(mentee_view[0].mentor.email, "mentor@x.com");

        let mentor_view = fx.requests.list_for_mentor(&mentor).unwrap();
        assert_eq!(mentor_view.len(), 2);
        assert_eq!(mentor_view[0].request.id, second.id);
        assert_eq!(mentor_view[0].student.registration_number, "RA001");
    }

    #[test]
    fn test_listings_scoped_to_party() {
        let fx = setup();
        let mentor_a = make_user(&fx.users, "a@x.com", UserRole::Mentor);
        let mentor_b = make_user(&fx.users, "b@x.com", UserRole::Mentor);
        let student = make_user(&fx.users, "s@x.com", UserRole::Mentee);

        make_request(&fx, mentor_a, student, "for a");

        assert_eq!(fx.requests.list_for_mentor(&mentor_a).unwrap().len(), 1);
        assert!(fx.requests.list_for_mentor(&mentor_b).unwrap().is_empty());
    }

    #[test]
    fn test_accepted_status_visible_in_mentee_listing() {
        let fx = setup();
        let mentor = make_user(&fx.users, "mentor@x.com", UserRole::Mentor);
        let student = make_user(&fx.users, "student@x.com", UserRole::Mentee);
        let request = make_request(&fx, mentor, student, "recursion");

        fx.requests
            .transition(&request.id, RequestStatus::Accepted)
            .unwrap();

        let listed = fx.requests.list_for_mentee(&student).unwrap();
        assert_eq!(listed[0].request.status, RequestStatus::Accepted);
    }
}
