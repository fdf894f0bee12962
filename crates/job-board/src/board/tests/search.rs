use super::common::{build_service, category, company, draft, employer, post_job};
use crate::board::domain::EmploymentType;
use crate::board::repository::JobRepository;
use crate::board::search::{SearchParams, SEARCH_PAGE_SIZE};

fn titles(results: &crate::board::SearchResults) -> Vec<&str> {
    results
        .jobs
        .items
        .iter()
        .map(|job| job.title.as_str())
        .collect()
}

#[test]
fn query_matches_title_description_company_and_skills() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let acme = company(&store, "Acme Robotics");
    let globex = company(&store, "Globex");

    post_job(&store, &owner, draft(&globex, "Frontend Developer"));
    let mut skilled = draft(&globex, "Platform Engineer");
    skilled.skills_required = "Rust, Kubernetes".to_string();
    post_job(&store, &owner, skilled);
    post_job(&store, &owner, draft(&acme, "Office Manager"));

    let by_skill = service
        .search(SearchParams {
            q: Some("kubernetes".to_string()),
            ..SearchParams::default()
        })
        .expect("search");
    assert_eq!(titles(&by_skill), vec!["Platform Engineer"]);

    let by_company = service
        .search(SearchParams {
            q: Some("ACME".to_string()),
            ..SearchParams::default()
        })
        .expect("search");
    assert_eq!(titles(&by_company), vec!["Office Manager"]);

    let by_description = service
        .search(SearchParams {
            q: Some("developer wanted".to_string()),
            ..SearchParams::default()
        })
        .expect("search");
    assert_eq!(titles(&by_description), vec!["Frontend Developer"]);
}

#[test]
fn listing_is_newest_first_and_hides_closed_postings() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let acme = company(&store, "Acme");

    let first = post_job(&store, &owner, draft(&acme, "First"));
    post_job(&store, &owner, draft(&acme, "Second"));
    let closed = post_job(&store, &owner, draft(&acme, "Closed"));
    store.set_job_active(closed.id, false).expect("closed");

    let results = service.search(SearchParams::default()).expect("search");
    assert_eq!(titles(&results), vec!["Second", "First"]);
    assert_eq!(results.jobs.total, 2);
    assert_eq!(results.jobs.items.last().map(|job| job.id), Some(first.id));
}

#[test]
fn filters_are_combined() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let acme = company(&store, "Acme");
    let engineering = category(&store, "Software Engineering");

    let mut lisbon = draft(&acme, "Lisbon Contractor");
    lisbon.location = "Lisbon, Portugal".to_string();
    lisbon.employment_type = EmploymentType::Contract;
    lisbon.salary_min = Some(90000);
    lisbon.category_id = Some(engineering.id);
    post_job(&store, &owner, lisbon);

    let mut underpaid = draft(&acme, "Lisbon Junior");
    underpaid.location = "Lisbon".to_string();
    underpaid.employment_type = EmploymentType::Contract;
    underpaid.salary_min = Some(40000);
    underpaid.category_id = Some(engineering.id);
    post_job(&store, &owner, underpaid);

    let mut elsewhere = draft(&acme, "Berlin Contractor");
    elsewhere.location = "Berlin".to_string();
    elsewhere.employment_type = EmploymentType::Contract;
    elsewhere.salary_min = Some(95000);
    post_job(&store, &owner, elsewhere);

    let results = service
        .search(SearchParams {
            location: Some("lisbon".to_string()),
            category: Some("software-engineering".to_string()),
            employment_type: Some("contract".to_string()),
            salary_min: Some("50000".to_string()),
            ..SearchParams::default()
        })
        .expect("search");
    assert_eq!(titles(&results), vec!["Lisbon Contractor"]);
}

#[test]
fn blank_parameters_do_not_filter() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let acme = company(&store, "Acme");
    post_job(&store, &owner, draft(&acme, "Anything"));

    let results = service
        .search(SearchParams {
            q: Some(String::new()),
            location: Some(String::new()),
            salary_min: Some("not-a-number".to_string()),
            ..SearchParams::default()
        })
        .expect("search");
    assert_eq!(results.jobs.total, 1);
}

#[test]
fn out_of_range_page_shows_the_last_page() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let acme = company(&store, "Acme");
    for index in 0..(SEARCH_PAGE_SIZE + 1) {
        post_job(&store, &owner, draft(&acme, &format!("Job {index}")));
    }

    let results = service
        .search(SearchParams {
            page: Some("99".to_string()),
            ..SearchParams::default()
        })
        .expect("search");
    assert_eq!(results.jobs.number, 2);
    assert_eq!(results.jobs.num_pages, 2);
    assert_eq!(titles(&results), vec!["Job 0"]);
    assert!(results.jobs.has_previous);
    assert!(!results.jobs.has_next);
}

#[test]
fn search_returns_categories_for_the_filter_bar() {
    let (service, store) = build_service();
    category(&store, "Design");
    category(&store, "Marketing");

    let results = service.search(SearchParams::default()).expect("search");
    let names: Vec<&str> = results
        .categories
        .iter()
        .map(|category| category.name.as_str())
        .collect();
    assert_eq!(names, vec!["Design", "Marketing"]);
    assert!(results.jobs.items.is_empty());
    assert_eq!(results.jobs.num_pages, 1);
}

#[test]
fn query_and_location_fold_non_ascii_case() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let acme = company(&store, "Acme");

    let mut french = draft(&acme, "Développeur Backend");
    french.location = "Île-de-France".to_string();
    post_job(&store, &owner, french);
    post_job(&store, &owner, draft(&acme, "Office Manager"));

    let by_title = service
        .search(SearchParams {
            q: Some("DÉVELOPPEUR".to_string()),
            ..SearchParams::default()
        })
        .expect("search");
    assert_eq!(titles(&by_title), vec!["Développeur Backend"]);

    let by_location = service
        .search(SearchParams {
            location: Some("ÎLE-DE".to_string()),
            ..SearchParams::default()
        })
        .expect("search");
    assert_eq!(titles(&by_location), vec!["Développeur Backend"]);
}

#[test]
fn salary_floor_skips_postings_without_a_minimum() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let acme = company(&store, "Acme");

    post_job(&store, &owner, draft(&acme, "Unlisted Pay"));
    let mut paid = draft(&acme, "Listed Pay");
    paid.salary_min = Some(60000);
    post_job(&store, &owner, paid);

    let results = service
        .search(SearchParams {
            salary_min: Some("0".to_string()),
            ..SearchParams::default()
        })
        .expect("search");
    assert_eq!(titles(&results), vec!["Listed Pay"]);
}

#[test]
fn unrecognized_choice_values_match_nothing() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    post_job(&store, &owner, draft(&company(&store, "Acme"), "Designer"));

    for params in [
        SearchParams {
            employment_type: Some("internship".to_string()),
            ..SearchParams::default()
        },
        SearchParams {
            work_mode: Some("orbital".to_string()),
            ..SearchParams::default()
        },
        SearchParams {
            experience_level: Some("wizard".to_string()),
            ..SearchParams::default()
        },
    ] {
        let results = service.search(params).expect("search");
        assert_eq!(results.jobs.total, 0);
        assert!(results.jobs.items.is_empty());
    }
}
