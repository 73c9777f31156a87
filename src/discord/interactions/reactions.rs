// Reaction collection for confirmation prompts.
//
// Subscribes, adds the two affordances, then waits for the first reaction
// that passes `ConfirmationRequest::qualifies`. The deadline is a tokio
// timeout around the collector so that an elapsed window and a closed
// collector stay distinct.

use crate::core::confirmation::{Actor, ConfirmationOutcome, ConfirmationRequest, Decision};
use futures_util::StreamExt;
use poise::serenity_prelude as serenity;

fn unicode_name(emoji: &serenity::ReactionType) -> Option<&str> {
    match emoji {
        serenity::ReactionType::Unicode(name) => Some(name.as_str()),
        _ => None,
    }
}

/// The decision a reaction stands for, if it counts at all. Reactions by
/// the bot itself and custom emoji never count.
fn decide(
    request: &ConfirmationRequest,
    bot_id: u64,
    emoji: &serenity::ReactionType,
    actor: &Actor,
) -> Option<Decision> {
    if actor.user_id == bot_id {
        return None;
    }
    request.qualifies(unicode_name(emoji)?, actor)
}

fn actor_of(reaction: &serenity::Reaction) -> Option<Actor> {
    let member = reaction.member.as_ref();
    Some(Actor {
        user_id: reaction.user_id?.get(),
        is_bot: member.map_or(false, |m| m.user.bot),
        role_ids: member
            .map(|m| m.roles.iter().map(|r| r.get()).collect())
            .unwrap_or_default(),
    })
}

/// Reduce a gateway reaction to the decision it stands for and who made it.
fn decision_for(
    request: &ConfirmationRequest,
    bot_id: u64,
    reaction: &serenity::Reaction,
) -> Option<(Decision, u64)> {
    let actor = actor_of(reaction)?;
    decide(request, bot_id, &reaction.emoji, &actor).map(|decision| (decision, actor.user_id))
}

async fn clear_reactions(http: &serenity::Http, message: &serenity::Message) {
    if let Err(e) = message.delete_reactions(http).await {
        tracing::debug!(message_id = message.id.get(), "Failed to clear reactions: {}", e);
    }
}

pub async fn await_reaction(
    shard: &serenity::ShardMessenger,
    http: &serenity::Http,
    message: &serenity::Message,
    request: &ConfirmationRequest,
) -> ConfirmationOutcome {
    let bot_id = message.author.id.get();
    let filter_request = request.clone();

    // `stream()` subscribes immediately; the affordances go up after it so
    // an early reaction isn't missed.
    let mut reactions = Box::pin(
        serenity::ReactionCollector::new(shard)
            .message_id(message.id)
            .filter(move |reaction| decision_for(&filter_request, bot_id, reaction).is_some())
            .stream(),
    );

    for emoji in [request.emoji.approve, request.emoji.deny] {
        let reaction = serenity::ReactionType::Unicode(emoji.to_string());
        if let Err(e) = message.react(http, reaction).await {
            return ConfirmationOutcome::Failed(format!("could not add reaction: {}", e));
        }
    }

    let collected = match request.window {
        Some(window) => match tokio::time::timeout(window, reactions.next()).await {
            Ok(collected) => collected,
            Err(_) => {
                clear_reactions(http, message).await;
                return ConfirmationOutcome::TimedOut;
            }
        },
        None => reactions.next().await,
    };

    clear_reactions(http, message).await;

    match collected
        .as_ref()
        .and_then(|reaction| decision_for(request, bot_id, reaction))
    {
        Some((decision, actor_id)) => ConfirmationOutcome::Decided { decision, actor_id },
        None => ConfirmationOutcome::Failed("reaction collector closed".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::confirmation::{Responder, MODERATION_EMOJI, MODERATION_WINDOW};

    const BOT: u64 = 1000;
    const ADMIN: u64 = 1;

    fn unicode(emoji: &str) -> serenity::ReactionType {
        serenity::ReactionType::Unicode(emoji.to_string())
    }

    fn actor(user_id: u64) -> Actor {
        Actor {
            user_id,
            is_bot: false,
            role_ids: Vec::new(),
        }
    }

    fn prompt(responder: Responder) -> ConfirmationRequest {
        ConfirmationRequest {
            emoji: MODERATION_EMOJI,
            responder,
            window: Some(MODERATION_WINDOW),
        }
    }

    #[test]
    fn test_requester_reactions_decide() {
        let request = prompt(Responder::User(ADMIN));

        assert_eq!(
            decide(&request, BOT, &unicode("👍"), &actor(ADMIN)),
            Some(Decision::Approve)
        );
        assert_eq!(
            decide(&request, BOT, &unicode("👎"), &actor(ADMIN)),
            Some(Decision::Deny)
        );
    }

    #[test]
    fn test_bot_affordances_never_count() {
        // Even a responder that would accept the bot's id must not see its
        // own 👍 as an answer.
        let request = prompt(Responder::Reviewer {
            submitter: 7,
            required_role: None,
        });

        assert_eq!(decide(&request, BOT, &unicode("👍"), &actor(BOT)), None);
        assert_eq!(
            decide(&request, BOT, &unicode("👍"), &actor(8)),
            Some(Decision::Approve)
        );
    }

    #[test]
    fn test_custom_emoji_are_ignored() {
        let request = prompt(Responder::User(ADMIN));
        let custom = serenity::ReactionType::Custom {
            animated: false,
            id: serenity::EmojiId::new(42),
            name: Some("👍".to_string()),
        };

        assert_eq!(decide(&request, BOT, &custom, &actor(ADMIN)), None);
    }
}
