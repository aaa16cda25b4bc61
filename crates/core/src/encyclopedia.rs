use crate::traits::EncyclopediaSource;
use crate::{ArticleError, ArticleSummary, ChosenArticle};
use tracing::{debug, warn};

pub async fn choose_article<S>(
    source: &S,
    query: &str,
    candidates: usize,
) -> Result<ChosenArticle, ArticleError>
where
    S: EncyclopediaSource + Sync + ?Sized,
{
    let limit = candidates.max(1);
    let hits = source
        .search_articles(query, limit)
        .await
        .map_err(ArticleError::SearchUnavailable)?;

    let Some(first_hit) = hits.first() else {
        return Err(ArticleError::NoArticleFound);
    };

    let mut first_loaded: Option<(usize, ChosenArticle)> = None;

    for (position, hit) in hits.iter().take(limit).enumerate() {
        let summary = match source.article_summary(&hit.title).await {
            Ok(summary) => with_title_fallback(summary, &hit.title),
            Err(error) => {
                warn!(title = %hit.title, %error, "summary fetch failed");
                continue;
            }
        };

        let chosen = ChosenArticle {
            summary,
            page_id: hit.page_id,
        };

        if !chosen.summary.is_disambiguation {
            return Ok(chosen);
        }

        debug!(title = %hit.title, "skipping disambiguation page");
        if first_loaded.is_none() {
            first_loaded = Some((position, chosen));
        }
    }

    if let Some((0, loaded)) = first_loaded {
        debug!(title = %first_hit.title, "falling back to first search hit");
        return Ok(loaded);
    }

    match source.article_summary(&first_hit.title).await {
        Ok(summary) => {
            debug!(title = %first_hit.title, "falling back to first search hit");
            Ok(ChosenArticle {
                summary: with_title_fallback(summary, &first_hit.title),
                page_id: first_hit.page_id,
            })
        }
        Err(error) => {
            warn!(title = %first_hit.title, %error, "fallback summary fetch failed");
            match first_loaded {
                Some((_, loaded)) => {
                    debug!(title = %loaded.summary.title, "falling back to first loaded summary");
                    Ok(loaded)
                }
                None => Err(ArticleError::SummaryUnavailable(error)),
            }
        }
    }
}

fn with_title_fallback(mut summary: ArticleSummary, hit_title: &str) -> ArticleSummary {
    if summary.title.trim().is_empty() {
        summary.title = hit_title.to_string();
    }
    summary
}
