pub mod recommendation_cards;
