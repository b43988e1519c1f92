// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use checkin_domain::PageRequest;

use super::{create_test_location, create_test_persistence};
use crate::{Persistence, PersistenceError};

#[test]
fn test_create_get_and_rename_school() {
    let mut persistence: Persistence = create_test_persistence();
    let school_id: i64 = persistence.create_school("Lincoln High").unwrap();

    let school = persistence.get_school(school_id).unwrap().unwrap();
    assert_eq!(school.name, "Lincoln High");

    persistence.update_school(school_id, "Lincoln Academy").unwrap();
    let school = persistence.get_school(school_id).unwrap().unwrap();
    assert_eq!(school.name, "Lincoln Academy");
}

#[test]
fn test_school_names_are_unique_ignoring_case() {
    let mut persistence: Persistence = create_test_persistence();
    let school_id: i64 = persistence.create_school("Lincoln High").unwrap();

    assert!(persistence.school_name_exists("LINCOLN HIGH", None).unwrap());
    assert!(
        !persistence
            .school_name_exists("lincoln high", Some(school_id))
            .unwrap()
    );
    assert!(matches!(
        persistence.create_school("lincoln high"),
        Err(PersistenceError::UniqueViolation(_))
    ));
}

#[test]
fn test_rename_missing_school_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    assert!(matches!(
        persistence.update_school(3, "Nowhere"),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_list_schools_orders_by_name() {
    let mut persistence: Persistence = create_test_persistence();
    for name in ["Washington", "Adams", "Jefferson"] {
        persistence.create_school(name).unwrap();
    }

    let page = persistence
        .list_schools(PageRequest::default(), None)
        .unwrap();
    let names: Vec<&str> = page.items.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Adams", "Jefferson", "Washington"]);
    assert_eq!(page.total, 3);
    assert_eq!(page.total_pages, 1);

    let searched = persistence
        .list_schools(PageRequest::default(), Some("son"))
        .unwrap();
    assert_eq!(searched.items.len(), 1);
    assert_eq!(searched.items[0].name, "Jefferson");
}

#[test]
fn test_delete_school_is_refused_while_referenced() {
    let mut persistence: Persistence = create_test_persistence();
    let location_id: i64 = create_test_location(&mut persistence, "Main Hall", "main-hall", 5);
    let school_id: i64 = persistence.create_school("Lincoln High").unwrap();
    let check_in_id: i64 = persistence
        .create_check_in(location_id, school_id, 5, "2026-03-10 09:00:00")
        .unwrap();

    assert!(matches!(
        persistence.delete_school(school_id),
        Err(PersistenceError::Referenced {
            entity: "school",
            ..
        })
    ));

    persistence.delete_check_in(check_in_id).unwrap();
    persistence.delete_school(school_id).unwrap();
    assert!(persistence.get_school(school_id).unwrap().is_none());
}

#[test]
fn test_delete_missing_school_is_not_found() {
    let mut persistence: Persistence = create_test_persistence();
    assert!(matches!(
        persistence.delete_school(11),
        Err(PersistenceError::NotFound(_))
    ));
}
