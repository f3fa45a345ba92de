use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use anyhow::Result;
use serde_json::Value;

use crate::explorer::SearchPlan;
use crate::model::{CatalogMeta, RecommendationRequest, SearchResponse};
use crate::remote::CatalogClient;

pub(super) enum Job {
    Meta,
    Search(SearchPlan),
    Recommend(RecommendationRequest),
}

pub(super) enum Outcome {
    Meta(Result<CatalogMeta>),
    Search {
        generation: u64,
        result: Result<SearchResponse>,
    },
    Recommendation(Result<Value>),
}

/// One background thread owns the blocking client; jobs are executed in
/// order, so the channel itself serializes requests. The controller's
/// loading gate keeps search jobs to at most one outstanding.
pub(super) fn spawn(client: CatalogClient) -> (Sender<Job>, Receiver<Outcome>) {
    let (job_tx, job_rx) = channel::<Job>();
    let (out_tx, out_rx) = channel::<Outcome>();

    thread::spawn(move || {
        for job in job_rx {
            let outcome = match job {
                Job::Meta => Outcome::Meta(client.meta()),
                Job::Search(plan) => Outcome::Search {
                    generation: plan.generation,
                    result: client.search(&plan.params),
                },
                Job::Recommend(request) => Outcome::Recommendation(client.recommend(&request)),
            };
            if out_tx.send(outcome).is_err() {
                break;
            }
        }
    });

    (job_tx, out_rx)
}
