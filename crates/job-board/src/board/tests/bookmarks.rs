use super::common::{build_service, company, draft, employer, post_job, seeker};
use crate::board::domain::JobId;
use crate::board::flash::FlashLevel;
use crate::board::repository::{BookmarkRepository, JobRepository};
use crate::board::BoardError;

#[test]
fn saving_twice_keeps_one_bookmark() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let jane = seeker(&store, "jane");
    let job = post_job(&store, &owner, draft(&company(&store, "Acme"), "Designer"));

    let first = service.save_job(&jane, job.id).expect("saved");
    assert!(first.has_level(FlashLevel::Success));
    assert_eq!(first.redirect, format!("/jobs/{}/", job.id.0));

    let second = service.save_job(&jane, job.id).expect("saved again");
    assert!(second.has_level(FlashLevel::Info));
    assert_eq!(second.messages[0].text, "Job already saved");

    assert_eq!(store.count_saved(jane.id).expect("count"), 1);
    assert!(service
        .job_detail(Some(&jane), job.id)
        .expect("detail")
        .is_saved);
}

#[test]
fn unsaving_succeeds_whether_or_not_a_bookmark_exists() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let jane = seeker(&store, "jane");
    let job = post_job(&store, &owner, draft(&company(&store, "Acme"), "Designer"));

    let missing = service.unsave_job(&jane, job.id).expect("nothing to remove");
    assert!(missing.has_level(FlashLevel::Success));

    service.save_job(&jane, job.id).expect("saved");
    service.unsave_job(&jane, job.id).expect("removed");
    assert!(!store.is_saved(jane.id, job.id).expect("lookup"));
}

#[test]
fn bookmarking_a_missing_job_is_not_found() {
    let (service, store) = build_service();
    let jane = seeker(&store, "jane");

    let err = service.save_job(&jane, JobId(77)).expect_err("missing job");
    assert!(matches!(err, BoardError::NotFound("job")));
}

#[test]
fn saved_jobs_are_newest_first_and_dropped_with_their_job() {
    let (service, store) = build_service();
    let owner = employer(&store, "acme_hr");
    let acme = company(&store, "Acme");
    let jane = seeker(&store, "jane");
    let designer = post_job(&store, &owner, draft(&acme, "Designer"));
    let writer = post_job(&store, &owner, draft(&acme, "Writer"));

    service.save_job(&jane, designer.id).expect("saved");
    service.save_job(&jane, writer.id).expect("saved");

    let page = service.saved_jobs(&jane, None).expect("listing");
    let titles: Vec<&str> = page.items.iter().map(|saved| saved.job.title.as_str()).collect();
    assert_eq!(titles, vec!["Writer", "Designer"]);

    store.delete_job(writer.id).expect("deleted");
    let page = service.saved_jobs(&jane, None).expect("listing");
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].job.id, designer.id);
}
