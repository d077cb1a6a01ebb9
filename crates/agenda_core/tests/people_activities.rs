use agenda_core::db::open_db_in_memory;
use agenda_core::{
    ActivityService, ActivityServiceError, ActivityStatus, CreateActivityRequest,
    CreatePersonRequest, Location, PersonService, PersonServiceError, RepoError,
    SqlitePersonRepository, SqliteRecordStore,
};
use rusqlite::Connection;
use uuid::Uuid;

fn activity_service(
    conn: &Connection,
) -> ActivityService<SqliteRecordStore<'_>, SqlitePersonRepository<'_>> {
    ActivityService::new(
        SqliteRecordStore::try_new(conn).unwrap(),
        SqlitePersonRepository::try_new(conn).unwrap(),
    )
}

fn person_service(
    conn: &Connection,
) -> PersonService<SqlitePersonRepository<'_>, SqliteRecordStore<'_>> {
    PersonService::new(
        SqlitePersonRepository::try_new(conn).unwrap(),
        SqliteRecordStore::try_new(conn).unwrap(),
    )
}

fn person_request(nickname: &str) -> CreatePersonRequest {
    CreatePersonRequest {
        email: format!("{nickname}@example.com"),
        nickname: nickname.to_string(),
        location: None,
    }
}

fn standup() -> CreateActivityRequest {
    CreateActivityRequest {
        title: "standup".to_string(),
        description: "daily sync".to_string(),
        status: ActivityStatus::Todo,
        start_ms: 1_000,
        end_ms: 2_000,
    }
}

#[test]
fn create_person_rejects_duplicates_and_invalid_fields() {
    let conn = open_db_in_memory().unwrap();
    let service = person_service(&conn);

    let created = service
        .create_person(CreatePersonRequest {
            location: Some(Location {
                lat: 37.5,
                lng: 127.0,
            }),
            ..person_request("ada")
        })
        .unwrap();
    assert!(!created.is_admin);
    assert_eq!(service.get_person(created.id).unwrap(), created);

    let err = service
        .create_person(CreatePersonRequest {
            email: "ADA@example.com".to_string(),
            ..person_request("other")
        })
        .unwrap_err();
    assert!(matches!(err, PersonServiceError::DuplicatePerson { .. }));

    let err = service
        .create_person(CreatePersonRequest {
            email: "fresh@example.com".to_string(),
            ..person_request("ada")
        })
        .unwrap_err();
    assert!(matches!(err, PersonServiceError::DuplicatePerson { .. }));

    let err = service
        .create_person(CreatePersonRequest {
            email: "nope".to_string(),
            ..person_request("nope")
        })
        .unwrap_err();
    assert!(matches!(
        err,
        PersonServiceError::Repo(RepoError::PersonValidation(_))
    ));
}

#[test]
fn list_people_pages_in_insertion_order_and_clamps_limit() {
    let conn = open_db_in_memory().unwrap();
    let service = person_service(&conn);
    let mut ids = Vec::new();
    for index in 0..15 {
        ids.push(
            service
                .create_person(person_request(&format!("p{index}")))
                .unwrap()
                .id,
        );
    }

    let first_page = service.list_people(Some(50), None).unwrap();
    assert_eq!(first_page.applied_limit, 12);
    assert_eq!(first_page.items.len(), 12);
    assert_eq!(first_page.items[0].id, ids[0]);

    let cursor = first_page.items.last().map(|person| person.id);
    let second_page = service.list_people(None, cursor).unwrap();
    let second_ids: Vec<_> = second_page.items.iter().map(|person| person.id).collect();
    assert_eq!(second_ids, ids[12..].to_vec());

    let last_page = service.list_people(None, Some(ids[14])).unwrap();
    assert!(last_page.items.is_empty());
}

#[test]
fn list_people_follows_cursor_and_honors_zero_limit() {
    let conn = open_db_in_memory().unwrap();
    let service = person_service(&conn);
    let ada = service.create_person(person_request("ada")).unwrap();
    let bob = service.create_person(person_request("bob")).unwrap();
    let cy = service.create_person(person_request("cy")).unwrap();

    let page = service.list_people(Some(1), Some(ada.id)).unwrap();
    assert_eq!(page.items, vec![bob]);

    let page = service.list_people(Some(5), Some(page.items[0].id)).unwrap();
    assert_eq!(page.items, vec![cy]);

    let empty = service.list_people(Some(0), None).unwrap();
    assert_eq!(empty.applied_limit, 0);
    assert!(empty.items.is_empty());

    let missing = Uuid::new_v4();
    let err = service.list_people(None, Some(missing)).unwrap_err();
    assert!(matches!(err, PersonServiceError::PersonNotFound(id) if id == missing));
}

#[test]
fn is_admin_is_false_for_new_and_unknown_people() {
    let conn = open_db_in_memory().unwrap();
    let service = person_service(&conn);
    let person = service.create_person(person_request("ada")).unwrap();

    assert!(!service.is_admin(person.id).unwrap());
    assert!(!service.is_admin(Uuid::new_v4()).unwrap());

    conn.execute(
        "UPDATE people SET is_admin = 1 WHERE id = ?1;",
        [person.id.to_string()],
    )
    .unwrap();
    assert!(service.is_admin(person.id).unwrap());
}

#[test]
fn activity_detail_includes_invitees() {
    let conn = open_db_in_memory().unwrap();
    let people = person_service(&conn);
    let activities = activity_service(&conn);
    let ada = people.create_person(person_request("ada")).unwrap();
    let bob = people.create_person(person_request("bob")).unwrap();

    let activity = activities.create_activity(standup()).unwrap();
    activities.add_invitee(activity.id, ada.id).unwrap();
    people.add_activity(bob.id, activity.id).unwrap();

    let detail = activities.get_activity(activity.id).unwrap();
    assert_eq!(detail.activity, activity);
    assert_eq!(detail.invitees, vec![ada.id, bob.id]);

    let invitees = activities.list_invitees(activity.id).unwrap();
    assert_eq!(invitees, vec![ada.clone(), bob.clone()]);

    assert_eq!(people.list_activities(bob.id).unwrap(), vec![activity.clone()]);

    activities.remove_invitee(activity.id, ada.id).unwrap();
    assert_eq!(
        activities.get_activity(activity.id).unwrap().invitees,
        vec![bob.id]
    );
}

#[test]
fn activity_operations_report_missing_targets() {
    let conn = open_db_in_memory().unwrap();
    let people = person_service(&conn);
    let activities = activity_service(&conn);
    let ada = people.create_person(person_request("ada")).unwrap();
    let activity = activities.create_activity(standup()).unwrap();
    let missing = Uuid::new_v4();

    assert!(matches!(
        activities.get_activity(missing).unwrap_err(),
        ActivityServiceError::ActivityNotFound(id) if id == missing
    ));
    assert!(matches!(
        activities.delete_activity(missing).unwrap_err(),
        ActivityServiceError::ActivityNotFound(id) if id == missing
    ));
    assert!(matches!(
        activities.add_invitee(missing, ada.id).unwrap_err(),
        ActivityServiceError::ActivityNotFound(id) if id == missing
    ));
    assert!(matches!(
        activities.add_invitee(activity.id, missing).unwrap_err(),
        ActivityServiceError::PersonNotFound(id) if id == missing
    ));
    assert!(matches!(
        people.add_activity(ada.id, missing).unwrap_err(),
        PersonServiceError::ActivityNotFound(id) if id == missing
    ));
    assert!(matches!(
        people.get_person(missing).unwrap_err(),
        PersonServiceError::PersonNotFound(id) if id == missing
    ));
}

#[test]
fn deleting_activity_removes_it_from_invitee_lists() {
    let conn = open_db_in_memory().unwrap();
    let people = person_service(&conn);
    let activities = activity_service(&conn);
    let ada = people.create_person(person_request("ada")).unwrap();
    let activity = activities.create_activity(standup()).unwrap();
    activities.add_invitee(activity.id, ada.id).unwrap();

    activities.delete_activity(activity.id).unwrap();

    assert!(people.list_activities(ada.id).unwrap().is_empty());
}

#[test]
fn create_activity_rejects_reversed_window() {
    let conn = open_db_in_memory().unwrap();
    let activities = activity_service(&conn);

    let err = activities
        .create_activity(CreateActivityRequest {
            start_ms: 5_000,
            end_ms: 1_000,
            ..standup()
        })
        .unwrap_err();
    assert!(matches!(
        err,
        ActivityServiceError::Repo(RepoError::Validation(_))
    ));
}

#[test]
fn activity_serialization_uses_expected_wire_fields() {
    let conn = open_db_in_memory().unwrap();
    let activities = activity_service(&conn);
    let activity = activities
        .create_activity(CreateActivityRequest {
            status: ActivityStatus::InProgress,
            ..standup()
        })
        .unwrap();
    let detail = activities.get_activity(activity.id).unwrap();

    let json = serde_json::to_value(&detail).unwrap();
    assert_eq!(json["id"], activity.id.to_string());
    assert_eq!(json["status"], "IN_PROGRESS");
    assert_eq!(json["start_ms"], 1_000);
    assert_eq!(json["invitees"], serde_json::json!([]));
}
