use chrono::NaiveDate;
use pebble_core::db::open_db_in_memory;
use pebble_core::{
    AggregateKind, Color, DocumentStore, Entity, Habit, HabitCategory, HabitCollection,
    HabitInstance, HabitRepository, Id, Recurrence, RecurrenceKind, RepoError,
    SqliteHabitRepository, WeekDay,
};
use rusqlite::Connection;

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn document_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM documents;", [], |row| row.get(0))
        .unwrap()
}

fn delete_document(conn: &Connection, collection: &str, id: &Id) {
    let deleted = conn
        .execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2;",
            [collection, id.as_str()],
        )
        .unwrap();
    assert_eq!(deleted, 1);
}

#[test]
fn daily_habit_roundtrip() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let saved = repo
        .save_habit(Habit::new("Drink Water", Recurrence::daily()))
        .unwrap();
    let id = saved.id.clone().unwrap();

    let loaded = repo.get_habit_by_id(&id).unwrap().unwrap();
    assert_eq!(loaded.recurrence.name(), "Daily");
    assert_eq!(loaded.recurrence.days_of_week(), Some(&WeekDay::all()));
    assert_eq!(loaded.name, "Drink Water");
    assert_eq!(loaded, saved);
}

#[test]
fn habit_with_category_and_color_roundtrip() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let category = repo
        .save_habit_category(
            HabitCategory::new("Health")
                .with_description("Body")
                .with_color(Color::new("#0f0").unwrap()),
        )
        .unwrap();
    let recurrence = Recurrence::new(
        RecurrenceKind::BiMonthly,
        Some([WeekDay::Monday, WeekDay::Saturday].into_iter().collect()),
    )
    .unwrap();
    let habit = Habit::new("Long run", recurrence.clone())
        .with_description("10k")
        .with_category(category.clone())
        .with_color(Color::new("#ff8800").unwrap());

    let saved = repo.save_habit(habit).unwrap();
    let loaded = repo
        .get_habit_by_id(saved.id.as_ref().unwrap())
        .unwrap()
        .unwrap();

    assert!(loaded.same_identity(&saved));
    assert_eq!(loaded.category, Some(category));
    assert_eq!(loaded.recurrence, recurrence);
    assert_eq!(loaded.color, Some(Color::new("#ff8800").unwrap()));
    assert_eq!(loaded.description.as_deref(), Some("10k"));
}

#[test]
fn get_habit_by_id_returns_none_when_absent() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);
    assert!(repo.get_habit_by_id(&Id::from("missing")).unwrap().is_none());
}

#[test]
fn save_habit_rejects_existing_id() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let saved = repo
        .save_habit(Habit::new("Read", Recurrence::daily()))
        .unwrap();
    let err = repo.save_habit(saved.clone()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::AlreadyExists { kind: AggregateKind::Habit, ref key }
            if Some(key.as_str()) == saved.id.as_ref().map(Id::as_str)
    ));
}

#[test]
fn save_habit_with_unknown_id_gets_fresh_id() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let saved = repo
        .save_habit(Habit::new("Read", Recurrence::daily()).with_id("client-side"))
        .unwrap();
    assert_ne!(saved.id, Some(Id::from("client-side")));
}

// Content-equal transient habits are not deduplicated; only ids are checked.
#[test]
fn transient_habits_with_same_content_accumulate() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let first = repo
        .save_habit(Habit::new("Meditate", Recurrence::daily()))
        .unwrap();
    let second = repo
        .save_habit(Habit::new("Meditate", Recurrence::daily()))
        .unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(repo.store().count("habits").unwrap(), 2);
}

#[test]
fn save_habit_requires_persisted_category() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let err = repo
        .save_habit(
            Habit::new("Stretch", Recurrence::daily()).with_category(HabitCategory::new("Health")),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::MissingId(AggregateKind::HabitCategory)
    ));
    assert_eq!(document_count(&conn), 0);
}

#[test]
fn habit_with_dangling_category_is_not_found() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let category = repo
        .save_habit_category(HabitCategory::new("Health"))
        .unwrap();
    let category_id = category.id.clone().unwrap();
    let habit = repo
        .save_habit(Habit::new("Stretch", Recurrence::daily()).with_category(category))
        .unwrap();
    delete_document(&conn, "habit_categories", &category_id);

    let err = repo.get_habit_by_id(habit.id.as_ref().unwrap()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: AggregateKind::HabitCategory, ref id } if *id == category_id
    ));
}

#[test]
fn get_habits_by_ids_omits_unknown_and_duplicates() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let a = repo.save_habit(Habit::new("A", Recurrence::daily())).unwrap();
    let b = repo
        .save_habit(Habit::new(
            "B",
            Recurrence::default_for(RecurrenceKind::Weekly),
        ))
        .unwrap();
    let ids = vec![
        a.id.clone().unwrap(),
        Id::from("nope"),
        b.id.clone().unwrap(),
        a.id.clone().unwrap(),
    ];

    let habits = repo.get_habits_by_ids(&ids).unwrap();
    assert_eq!(habits, vec![a, b]);
    assert!(repo.get_habits_by_ids(&[]).unwrap().is_empty());
}

#[test]
fn category_names_are_unique() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let health = repo
        .save_habit_category(HabitCategory::new("Health"))
        .unwrap();
    let err = repo
        .save_habit_category(HabitCategory::new("Health").with_description("again"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::AlreadyExists { kind: AggregateKind::HabitCategory, ref key } if key == "Health"
    ));

    let work = repo.save_habit_category(HabitCategory::new("Work")).unwrap();
    assert!(health.id.is_some());
    assert!(work.id.is_some());
    assert_ne!(health.id, work.id);
}

#[test]
fn category_lookup_by_name() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    assert!(repo.get_habit_category_by_name("Health").unwrap().is_none());
    let saved = repo
        .save_habit_category(HabitCategory::new("Health").with_color(Color::new("#123").unwrap()))
        .unwrap();

    let loaded = repo.get_habit_category_by_name("Health").unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert!(repo.get_habit_category_by_name("health").unwrap().is_none());
}

#[test]
fn collection_roundtrip_resolves_habits() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let water = repo
        .save_habit(Habit::new("Drink Water", Recurrence::daily()))
        .unwrap();
    let run = repo
        .save_habit(Habit::new(
            "Run",
            Recurrence::default_for(RecurrenceKind::BiWeekly),
        ))
        .unwrap();

    let saved = repo
        .save_habit_collection(
            HabitCollection::new("Morning")
                .with_description("Before work")
                .with_habits([water.clone(), run.clone()]),
        )
        .unwrap();
    let loaded = repo
        .get_habit_collection_by_id(saved.id.as_ref().unwrap())
        .unwrap()
        .unwrap();

    assert_eq!(loaded.habits().len(), 2);
    assert!(loaded.contains_habit(&water));
    assert!(loaded.contains_habit(&run));
    assert!(loaded.habit_instances().is_empty());
    assert_eq!(loaded.description.as_deref(), Some("Before work"));
    assert!(loaded.same_identity(&saved));
}

#[test]
fn collection_roundtrip_resolves_instances_and_their_habits() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let habit = repo
        .save_habit(Habit::new("Journal", Recurrence::daily()))
        .unwrap();
    let instance = repo
        .save_habit_instance(
            HabitInstance::new(habit.clone(), date(2024, 1, 15), true).with_note("short"),
        )
        .unwrap();
    let saved = repo
        .save_habit_collection(
            HabitCollection::new("Evening")
                .with_habits([habit.clone()])
                .with_habit_instances([instance.clone()]),
        )
        .unwrap();

    let loaded = repo
        .get_habit_collection_by_id(saved.id.as_ref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(loaded.habit_instances(), &[instance.clone()][..]);
    assert_eq!(loaded.habit_instances()[0].habit, habit);
}

#[test]
fn collection_with_dangling_instance_habit_is_not_found() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let kept = repo.save_habit(Habit::new("Kept", Recurrence::daily())).unwrap();
    let doomed = repo
        .save_habit(Habit::new("Doomed", Recurrence::daily()))
        .unwrap();
    let instance = repo
        .save_habit_instance(HabitInstance::new(doomed.clone(), date(2024, 2, 1), false))
        .unwrap();
    let collection = repo
        .save_habit_collection(
            HabitCollection::new("Mixed")
                .with_habits([kept])
                .with_habit_instances([instance]),
        )
        .unwrap();

    let doomed_id = doomed.id.unwrap();
    delete_document(&conn, "habits", &doomed_id);

    let err = repo
        .get_habit_collection_by_id(collection.id.as_ref().unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: AggregateKind::Habit, ref id } if *id == doomed_id
    ));
}

#[test]
fn collection_with_dangling_habit_is_not_found() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let habit = repo.save_habit(Habit::new("Gone", Recurrence::daily())).unwrap();
    let collection = repo
        .save_habit_collection(HabitCollection::new("Solo").with_habits([habit.clone()]))
        .unwrap();
    delete_document(&conn, "habits", habit.id.as_ref().unwrap());

    let err = repo
        .get_habit_collection_by_id(collection.id.as_ref().unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: AggregateKind::Habit, .. }
    ));
}

#[test]
fn collection_with_dangling_instance_is_not_found() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let habit = repo.save_habit(Habit::new("Walk", Recurrence::daily())).unwrap();
    let instance = repo
        .save_habit_instance(HabitInstance::new(habit, date(2024, 3, 3), true))
        .unwrap();
    let instance_id = instance.id.clone().unwrap();
    let collection = repo
        .save_habit_collection(HabitCollection::new("Walks").with_habit_instances([instance]))
        .unwrap();
    delete_document(&conn, "habit_instances", &instance_id);

    let err = repo
        .get_habit_collection_by_id(collection.id.as_ref().unwrap())
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: AggregateKind::HabitInstance, ref id } if *id == instance_id
    ));
}

#[test]
fn save_collection_rejects_existing_id_and_transient_members() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let saved = repo
        .save_habit_collection(HabitCollection::new("Empty"))
        .unwrap();
    let err = repo.save_habit_collection(saved).unwrap_err();
    assert!(matches!(
        err,
        RepoError::AlreadyExists { kind: AggregateKind::HabitCollection, .. }
    ));

    let err = repo
        .save_habit_collection(
            HabitCollection::new("Transient")
                .with_habits([Habit::new("Unsaved", Recurrence::daily())]),
        )
        .unwrap_err();
    assert!(matches!(err, RepoError::MissingId(AggregateKind::Habit)));
}

#[test]
fn update_collection_without_id_does_not_touch_store() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    repo.save_habit_collection(HabitCollection::new("Existing"))
        .unwrap();
    let before: String = conn
        .query_row("SELECT body FROM documents;", [], |row| row.get(0))
        .unwrap();

    let err = repo
        .update_habit_collection(HabitCollection::new("Existing"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::MissingId(AggregateKind::HabitCollection)
    ));

    let after: String = conn
        .query_row("SELECT body FROM documents;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(before, after);
    assert_eq!(document_count(&conn), 1);
}

#[test]
fn update_unknown_collection_is_not_found() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let err = repo
        .update_habit_collection(HabitCollection::new("Ghost").with_id("ghost"))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: AggregateKind::HabitCollection, ref id } if id.as_str() == "ghost"
    ));
}

#[test]
fn update_collection_overwrites_fields_and_keeps_id() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let habit = repo.save_habit(Habit::new("Floss", Recurrence::daily())).unwrap();
    let mut collection = repo
        .save_habit_collection(HabitCollection::new("Night"))
        .unwrap();
    let id = collection.id.clone().unwrap();

    collection.name = "Bedtime".to_string();
    collection.add_habit(habit.clone()).unwrap();
    let returned = repo.update_habit_collection(collection.clone()).unwrap();
    assert_eq!(returned, collection);

    let loaded = repo.get_habit_collection_by_id(&id).unwrap().unwrap();
    assert_eq!(loaded.id, Some(id));
    assert_eq!(loaded.name, "Bedtime");
    assert!(loaded.contains_habit(&habit));
    assert_eq!(repo.store().count("habit_collections").unwrap(), 1);
}

#[test]
fn habit_instance_roundtrip() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let habit = repo
        .save_habit(Habit::new(
            "Call parents",
            Recurrence::new(
                RecurrenceKind::Weekly,
                Some([WeekDay::Sunday].into_iter().collect()),
            )
            .unwrap(),
        ))
        .unwrap();
    let saved = repo
        .save_habit_instance(
            HabitInstance::new(habit.clone(), date(2023, 12, 31), true).with_note("long call"),
        )
        .unwrap();

    let loaded = repo
        .get_habit_instance_by_id(saved.id.as_ref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.habit, habit);
    assert!(repo
        .get_habit_instance_by_id(&Id::from("missing"))
        .unwrap()
        .is_none());
}

#[test]
fn save_habit_instance_checks_ids() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let err = repo
        .save_habit_instance(HabitInstance::new(
            Habit::new("Unsaved", Recurrence::daily()),
            date(2024, 1, 1),
            true,
        ))
        .unwrap_err();
    assert!(matches!(err, RepoError::MissingId(AggregateKind::Habit)));

    let habit = repo.save_habit(Habit::new("Saved", Recurrence::daily())).unwrap();
    let instance = repo
        .save_habit_instance(HabitInstance::new(habit, date(2024, 1, 1), true))
        .unwrap();
    let err = repo.save_habit_instance(instance).unwrap_err();
    assert!(matches!(
        err,
        RepoError::AlreadyExists { kind: AggregateKind::HabitInstance, .. }
    ));
}

#[test]
fn stored_habit_uses_wire_schema() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let category = repo.save_habit_category(HabitCategory::new("Mind")).unwrap();
    let habit = repo
        .save_habit(
            Habit::new("Read", Recurrence::default_for(RecurrenceKind::BiWeekly))
                .with_category(category.clone()),
        )
        .unwrap();

    let fields = repo
        .store()
        .find_one_by_id("habits", habit.id.as_ref().unwrap())
        .unwrap()
        .unwrap();
    assert_eq!(
        serde_json::Value::Object(fields),
        serde_json::json!({
            "name": "Read",
            "recurrence": "Bi-Weekly",
            "recurrence_days": ["Tuesday", "Friday"],
            "description": null,
            "category_id": category.id.unwrap().as_str(),
            "color_hex": null,
            "_id": habit.id.unwrap().as_str(),
        })
    );
}

#[test]
fn save_habit_rejects_unstored_category() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let err = repo
        .save_habit(
            Habit::new("Run", Recurrence::daily())
                .with_category(HabitCategory::new("Ghost").with_id("never-saved")),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: AggregateKind::HabitCategory, ref id } if id.as_str() == "never-saved"
    ));
    assert_eq!(document_count(&conn), 0);
}

#[test]
fn save_habit_instance_rejects_unstored_habit() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let err = repo
        .save_habit_instance(HabitInstance::new(
            Habit::new("Ghost", Recurrence::daily()).with_id("ghost"),
            date(2024, 1, 1),
            true,
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: AggregateKind::Habit, ref id } if id.as_str() == "ghost"
    ));
    assert_eq!(document_count(&conn), 0);
}

#[test]
fn save_collection_rejects_unstored_members() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let stored = repo.save_habit(Habit::new("Real", Recurrence::daily())).unwrap();
    let ghost = Habit::new("Ghost", Recurrence::daily()).with_id("ghost-habit");

    let err = repo
        .save_habit_collection(
            HabitCollection::new("Mixed").with_habits([stored.clone(), ghost.clone()]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: AggregateKind::Habit, ref id } if id.as_str() == "ghost-habit"
    ));

    let ghost_instance =
        HabitInstance::new(stored.clone(), date(2024, 1, 2), true).with_id("ghost-instance");
    let err = repo
        .save_habit_collection(
            HabitCollection::new("Mixed")
                .with_habits([stored])
                .with_habit_instances([ghost_instance]),
        )
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: AggregateKind::HabitInstance, ref id } if id.as_str() == "ghost-instance"
    ));
    assert_eq!(repo.store().count("habit_collections").unwrap(), 0);
}

#[test]
fn update_collection_rejects_unstored_members() {
    let conn = setup();
    let repo = SqliteHabitRepository::from_connection(&conn);

    let mut collection = repo
        .save_habit_collection(HabitCollection::new("Night"))
        .unwrap();
    let id = collection.id.clone().unwrap();
    collection
        .add_habit(Habit::new("Ghost", Recurrence::daily()).with_id("ghost-habit"))
        .unwrap();

    let err = repo.update_habit_collection(collection).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound { kind: AggregateKind::Habit, .. }
    ));

    let stored = repo.get_habit_collection_by_id(&id).unwrap().unwrap();
    assert!(stored.habits().is_empty());
}
