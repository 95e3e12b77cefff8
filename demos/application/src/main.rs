use std::sync::Arc;

use amqp::{AmqpConnectionProvider, BasicProperties, BrokerConfig};
use event_publisher::{EventPublisher, JsonEncoder, PublishError, PublisherConfiguration};
use futures::StreamExt;
use lapin::{
    options::{
        BasicAckOptions, BasicConsumeOptions, ExchangeDeclareOptions, QueueBindOptions,
        QueueDeclareOptions,
    },
    types::FieldTable,
    Connection, ConnectionProperties, ExchangeKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const EXCHANGE: &str = "orders";
const DEMO_QUEUE: &str = "demo-queue";
const ORDER_CREATED: &str = "order.created";
const ORDER_DISPATCHED: &str = "order.dispatched";

#[derive(Debug, Serialize, Deserialize)]
struct OrderCreated {
    event_id: Uuid,
    order_id: Uuid,
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct OrderDispatched {
    event_id: Uuid,
    order_id: Uuid,
    dispatched_at: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = BrokerConfig::default();

    let consumer_connection =
        Connection::connect(&config.amqp_uri(), ConnectionProperties::default())
            .await
            .unwrap();
    let consumer_channel = consumer_connection.create_channel().await.unwrap();
    setup_amqp(&consumer_channel).await;

    let publisher = EventPublisher::new(Arc::new(AmqpConnectionProvider::new()));
    publisher
        .add_event(PublisherConfiguration::<OrderCreated>::new(
            config.clone(),
            EXCHANGE,
            ORDER_CREATED,
            BasicProperties::default(),
            JsonEncoder::new(),
            report_failure::<OrderCreated>,
        ))
        .await;
    publisher
        .add_event(PublisherConfiguration::<OrderDispatched>::new(
            config.clone(),
            EXCHANGE,
            ORDER_DISPATCHED,
            BasicProperties::default(),
            JsonEncoder::new(),
            report_failure::<OrderDispatched>,
        ))
        .await;

    let mock_consumer = consumer_channel
        .basic_consume(
            DEMO_QUEUE,
            "demo-consumer",
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await
        .unwrap();

    let n = 10;
    for i in 0..n {
        let order_id = Uuid::new_v4();
        publisher
            .publish_event(&OrderCreated {
                event_id: Uuid::new_v4(),
                order_id,
                name: format!("name {}", i),
            })
            .await;
        publisher
            .publish_event(&OrderDispatched {
                event_id: Uuid::new_v4(),
                order_id,
                dispatched_at: "2021-01-01".into(),
            })
            .await;
    }

    consume(mock_consumer, n * 2).await;
    publisher.clean_up().await;
}

fn report_failure<E: std::fmt::Debug>(event: &E, error: &PublishError) {
    tracing::error!(%error, ?event, "failed to publish event");
}

async fn setup_amqp(ch: &lapin::Channel) {
    ch.exchange_declare(
        EXCHANGE,
        ExchangeKind::Topic,
        ExchangeDeclareOptions::default(),
        FieldTable::default(),
    )
    .await
    .unwrap();
    ch.queue_declare(
        DEMO_QUEUE,
        QueueDeclareOptions::default(),
        FieldTable::default(),
    )
    .await
    .unwrap();
    for rk in [ORDER_CREATED, ORDER_DISPATCHED] {
        ch.queue_bind(
            DEMO_QUEUE,
            EXCHANGE,
            rk,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
        .unwrap();
    }
}

async fn consume(mut consumer: lapin::Consumer, n: usize) {
    for _ in 0..n {
        let Some(delivery) = consumer.next().await else {
            panic!("stream is closed")
        };
        let delivery = delivery.expect("error in consumer");
        delivery.ack(BasicAckOptions::default()).await.expect("ack");

        let event: serde_json::Value = serde_json::from_slice(&delivery.data).unwrap();
        println!("Consumed {}: {}", delivery.routing_key, event);
    }
}
