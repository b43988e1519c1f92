// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use checkin_domain::Page;

use crate::tests::helpers::{
    create_test_admin, create_test_location, create_test_manager, create_test_persistence,
    create_test_school, test_config,
};
use crate::{
    ApiError, AuthenticatedActor, CreateCheckInRequest, ListQuery, SchoolRequest, SchoolResponse,
    create_check_in, create_school, delete_school, get_school, list_schools, update_school,
};

fn request(name: &str) -> SchoolRequest {
    SchoolRequest {
        name: name.to_string(),
    }
}

#[test]
fn test_any_actor_can_read_schools() {
    let mut persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let manager: AuthenticatedActor = create_test_manager(&mut persistence);
    let school_id: i64 = create_test_school(&mut persistence, &admin, "Lincoln Elementary");

    let listed: Page<SchoolResponse> =
        list_schools(&mut persistence, &manager, &ListQuery::default()).unwrap();
    let fetched: SchoolResponse = get_school(&mut persistence, &manager, school_id).unwrap();

    assert_eq!(listed.total, 1);
    assert_eq!(fetched.name, "Lincoln Elementary");
}

#[test]
fn test_manager_cannot_create_school() {
    let mut persistence = create_test_persistence();
    let manager: AuthenticatedActor = create_test_manager(&mut persistence);

    let result = create_school(&mut persistence, &manager, &request("Adams Middle"));

    assert!(matches!(result, Err(ApiError::Forbidden { .. })));
}

#[test]
fn test_school_name_is_validated_and_unique() {
    let mut persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    create_test_school(&mut persistence, &admin, "Adams Middle");

    let blank = create_school(&mut persistence, &admin, &request("   "));
    let duplicate = create_school(&mut persistence, &admin, &request("adams middle"));

    assert!(matches!(blank, Err(ApiError::InvalidInput { field, .. }) if field == "name"));
    assert!(matches!(duplicate, Err(ApiError::Conflict { .. })));
}

#[test]
fn test_rename_school() {
    let mut persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let school_id: i64 = create_test_school(&mut persistence, &admin, "Adams Middle");
    create_test_school(&mut persistence, &admin, "Lincoln Elementary");

    let renamed: SchoolResponse = update_school(
        &mut persistence,
        &admin,
        school_id,
        &request("Adams Middle School"),
    )
    .unwrap();
    let conflict = update_school(
        &mut persistence,
        &admin,
        school_id,
        &request("Lincoln Elementary"),
    );
    let keep_own_name = update_school(
        &mut persistence,
        &admin,
        school_id,
        &request("Adams Middle School"),
    );

    assert_eq!(renamed.name, "Adams Middle School");
    assert!(matches!(conflict, Err(ApiError::Conflict { .. })));
    assert!(keep_own_name.is_ok());
}

#[test]
fn test_delete_school_refused_while_referenced() {
    let mut persistence = create_test_persistence();
    let admin: AuthenticatedActor = create_test_admin(&mut persistence);
    let school_id: i64 = create_test_school(&mut persistence, &admin, "Adams Middle");
    let spare_id: i64 = create_test_school(&mut persistence, &admin, "Spare School");
    let (_, kiosk) = create_test_location(&mut persistence, &admin, "Main Gym", 10, "gym");
    create_check_in(
        &mut persistence,
        &test_config(),
        &kiosk,
        &CreateCheckInRequest {
            school_id,
            location_id: None,
        },
    )
    .unwrap();

    let referenced = delete_school(&mut persistence, &admin, school_id);
    let unreferenced = delete_school(&mut persistence, &admin, spare_id);

    assert!(matches!(referenced, Err(ApiError::Conflict { .. })));
    assert!(unreferenced.is_ok());
    assert!(matches!(
        get_school(&mut persistence, &admin, spare_id),
        Err(ApiError::ResourceNotFound { .. })
    ));
}
